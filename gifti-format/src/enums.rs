//! Enumerated attribute values and their GIFTI names.
//!
//! The name tables are compile time constants; lookups are linear scans over
//! tens of entries.

use std::fmt;

macro_rules! name_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $table:ident {
            $($variant:ident => ($text:literal, $code:literal),)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, PartialEq, Hash)]
        pub enum $name {
            $($variant,)*
        }

        const $table: &[($name, &str, i32)] = &[
            $(($name::$variant, $text, $code),)*
        ];

        impl $name {
            /// Every value, in declaration order.
            pub fn all() -> impl Iterator<Item = $name> {
                $table.iter().map(|(value, _, _)| *value)
            }

            pub fn from_name(name: &str) -> Option<$name> {
                $table
                    .iter()
                    .find(|(_, text, _)| *text == name)
                    .map(|(value, _, _)| *value)
            }

            pub fn from_code(code: i32) -> Option<$name> {
                $table
                    .iter()
                    .find(|(_, _, c)| *c == code)
                    .map(|(value, _, _)| *value)
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)*
                }
            }

            pub fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

name_table! {
    /// What a data array represents, using the NIFTI intent codes.
    pub enum Intent: INTENTS {
        None => ("NIFTI_INTENT_NONE", 0),
        Correl => ("NIFTI_INTENT_CORREL", 2),
        TTest => ("NIFTI_INTENT_TTEST", 3),
        FTest => ("NIFTI_INTENT_FTEST", 4),
        ZScore => ("NIFTI_INTENT_ZSCORE", 5),
        ChiSq => ("NIFTI_INTENT_CHISQ", 6),
        Beta => ("NIFTI_INTENT_BETA", 7),
        Binom => ("NIFTI_INTENT_BINOM", 8),
        Gamma => ("NIFTI_INTENT_GAMMA", 9),
        Poisson => ("NIFTI_INTENT_POISSON", 10),
        Normal => ("NIFTI_INTENT_NORMAL", 11),
        FTestNonc => ("NIFTI_INTENT_FTEST_NONC", 12),
        ChiSqNonc => ("NIFTI_INTENT_CHISQ_NONC", 13),
        Logistic => ("NIFTI_INTENT_LOGISTIC", 14),
        Laplace => ("NIFTI_INTENT_LAPLACE", 15),
        Uniform => ("NIFTI_INTENT_UNIFORM", 16),
        TTestNonc => ("NIFTI_INTENT_TTEST_NONC", 17),
        Weibull => ("NIFTI_INTENT_WEIBULL", 18),
        Chi => ("NIFTI_INTENT_CHI", 19),
        InvGauss => ("NIFTI_INTENT_INVGAUSS", 20),
        ExtVal => ("NIFTI_INTENT_EXTVAL", 21),
        PVal => ("NIFTI_INTENT_PVAL", 22),
        LogPVal => ("NIFTI_INTENT_LOGPVAL", 23),
        Log10PVal => ("NIFTI_INTENT_LOG10PVAL", 24),
        Estimate => ("NIFTI_INTENT_ESTIMATE", 1001),
        Label => ("NIFTI_INTENT_LABEL", 1002),
        NeuroName => ("NIFTI_INTENT_NEURONAME", 1003),
        GenMatrix => ("NIFTI_INTENT_GENMATRIX", 1004),
        SymMatrix => ("NIFTI_INTENT_SYMMATRIX", 1005),
        DispVect => ("NIFTI_INTENT_DISPVECT", 1006),
        Vector => ("NIFTI_INTENT_VECTOR", 1007),
        PointSet => ("NIFTI_INTENT_POINTSET", 1008),
        Triangle => ("NIFTI_INTENT_TRIANGLE", 1009),
        Quaternion => ("NIFTI_INTENT_QUATERNION", 1010),
        Dimless => ("NIFTI_INTENT_DIMLESS", 1011),
        TimeSeries => ("NIFTI_INTENT_TIME_SERIES", 2001),
        NodeIndex => ("NIFTI_INTENT_NODE_INDEX", 2002),
        RgbVector => ("NIFTI_INTENT_RGB_VECTOR", 2003),
        RgbaVector => ("NIFTI_INTENT_RGBA_VECTOR", 2004),
        Shape => ("NIFTI_INTENT_SHAPE", 2005),
        ConnectivityDense => ("NIFTI_INTENT_CONNECTIVITY_DENSE", 3001),
        ConnectivityDenseTime => ("NIFTI_INTENT_CONNECTIVITY_DENSE_TIME", 3002),
        ConnectivityParcellated => ("NIFTI_INTENT_CONNECTIVITY_PARCELLATED", 3003),
        ConnectivityParcellatedTime => ("NIFTI_INTENT_CONNECTIVITY_PARCELLATED_TIME", 3004),
        ConnectivityTrajectory => ("NIFTI_INTENT_CONNECTIVITY_TRAJECTORY", 3005),
        DeformationNodeIndices => ("NIFTI_INTENT_CARET_DEFORMATION_NODE_INDICES", 25000),
        DeformationNodeAreas => ("NIFTI_INTENT_CARET_DEFORMATION_NODE_AREAS", 25001),
    }
}

name_table! {
    /// Element types a GIFTI data array may hold.
    pub enum DataType: DATA_TYPES {
        UInt8 => ("NIFTI_TYPE_UINT8", 2),
        Int32 => ("NIFTI_TYPE_INT32", 8),
        Float32 => ("NIFTI_TYPE_FLOAT32", 16),
    }
}

name_table! {
    /// On-disk representation of a data array payload.
    pub enum Encoding: ENCODINGS {
        Ascii => ("ASCII", 1),
        Base64Binary => ("Base64Binary", 2),
        GZipBase64Binary => ("GZipBase64Binary", 3),
        ExternalFileBinary => ("ExternalFileBinary", 4),
    }
}

name_table! {
    /// Which index varies fastest in the flat element buffer.
    pub enum IndexOrder: INDEX_ORDERS {
        RowMajor => ("RowMajorOrder", 1),
        ColumnMajor => ("ColumnMajorOrder", 2),
    }
}

impl Default for Intent {
    fn default() -> Self {
        Intent::None
    }
}

impl Intent {
    /// Element type data arrays with this intent are held in.
    pub fn data_type(self) -> DataType {
        match self {
            Intent::Label | Intent::Triangle | Intent::NodeIndex => DataType::Int32,
            _ => DataType::Float32,
        }
    }
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Float32
    }
}

impl DataType {
    /// Width of one element in bytes.
    #[inline(always)]
    pub const fn size(self) -> usize {
        match self {
            DataType::UInt8 => 1,
            DataType::Int32 => 4,
            DataType::Float32 => 4,
        }
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Ascii
    }
}

impl Encoding {
    #[inline(always)]
    pub fn is_external(self) -> bool {
        self == Encoding::ExternalFileBinary
    }
}

impl Default for IndexOrder {
    fn default() -> Self {
        IndexOrder::RowMajor
    }
}

impl IndexOrder {
    pub fn flipped(self) -> IndexOrder {
        match self {
            IndexOrder::RowMajor => IndexOrder::ColumnMajor,
            IndexOrder::ColumnMajor => IndexOrder::RowMajor,
        }
    }
}
