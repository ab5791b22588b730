use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::GiftiFile;
use crate::array::{checked_byte_len, DataArray};
use crate::byte_order::Endian;
use crate::de::{ArrayDecodeParams, ExternalFile};
use crate::enums::{DataType, Encoding, IndexOrder, Intent};
use crate::error::{GiftiError, Result};
use crate::header::{attrs, is_supported_version, tags, MAX_SUPPORTED_VERSION, MIN_SUPPORTED_VERSION};
use crate::label::Label;
use crate::matrix::TransformMatrix;

/// Position of the reader in the element tree.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum State {
    None,
    Gifti,
    MetaData,
    MetaDataEntry,
    MetaDataName,
    MetaDataValue,
    LabelTable,
    LabelTableLabel,
    DataArray,
    DataArrayData,
    DataArrayMatrix,
    DataArrayMatrixDataSpace,
    DataArrayMatrixTransformedSpace,
    DataArrayMatrixData,
}

impl State {
    /// Tag of the element this state stands for.
    pub fn element(self) -> &'static str {
        match self {
            State::None => "document",
            State::Gifti => tags::GIFTI,
            State::MetaData => tags::METADATA,
            State::MetaDataEntry => tags::METADATA_ENTRY,
            State::MetaDataName => tags::METADATA_NAME,
            State::MetaDataValue => tags::METADATA_VALUE,
            State::LabelTable => tags::LABEL_TABLE,
            State::LabelTableLabel => tags::LABEL,
            State::DataArray => tags::DATA_ARRAY,
            State::DataArrayData => tags::DATA,
            State::DataArrayMatrix => tags::MATRIX,
            State::DataArrayMatrixDataSpace => tags::MATRIX_DATA_SPACE,
            State::DataArrayMatrixTransformedSpace => tags::MATRIX_TRANSFORMED_SPACE,
            State::DataArrayMatrixData => tags::MATRIX_DATA,
        }
    }

    /// Child tags allowed in this state and the states they lead to.
    pub fn children(self) -> &'static [(&'static str, State)] {
        match self {
            State::None => &[(tags::GIFTI, State::Gifti)],
            State::Gifti => &[
                (tags::METADATA, State::MetaData),
                (tags::LABEL_TABLE, State::LabelTable),
                (tags::DATA_ARRAY, State::DataArray),
            ],
            State::MetaData => &[(tags::METADATA_ENTRY, State::MetaDataEntry)],
            State::MetaDataEntry => &[
                (tags::METADATA_NAME, State::MetaDataName),
                (tags::METADATA_VALUE, State::MetaDataValue),
            ],
            State::LabelTable => &[(tags::LABEL, State::LabelTableLabel)],
            State::DataArray => &[
                (tags::METADATA, State::MetaData),
                (tags::DATA, State::DataArrayData),
                (tags::MATRIX, State::DataArrayMatrix),
            ],
            State::DataArrayMatrix => &[
                (tags::MATRIX_DATA_SPACE, State::DataArrayMatrixDataSpace),
                (tags::MATRIX_TRANSFORMED_SPACE, State::DataArrayMatrixTransformedSpace),
                (tags::MATRIX_DATA, State::DataArrayMatrixData),
            ],
            State::MetaDataName
            | State::MetaDataValue
            | State::LabelTableLabel
            | State::DataArrayData
            | State::DataArrayMatrixDataSpace
            | State::DataArrayMatrixTransformedSpace
            | State::DataArrayMatrixData => &[],
        }
    }
}

/// The state entered when `tag` opens inside `state`.
pub fn transition(state: State, tag: &str) -> Result<State> {
    let children = state.children();
    if let Some((_, next)) = children.iter().find(|(child, _)| *child == tag) {
        return Ok(*next);
    }

    let message = match state {
        State::None => format!(
            "Root element is \"{}\" but should be {}",
            tag,
            tags::GIFTI
        ),
        _ if children.is_empty() => format!(
            "{} has child \"{}\" but should not have any child elements",
            state.element(),
            tag
        ),
        _ => {
            let legal: Vec<&str> = children.iter().map(|(child, _)| *child).collect();
            format!(
                "Child of {} is \"{}\" but should be one of {}",
                state.element(),
                tag,
                legal.join(", ")
            )
        }
    };
    Err(GiftiError::malformed(message))
}

/// Attributes of a start tag, unescaped.
#[derive(Debug, Clone, Default)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of a required attribute of `element`.
    fn required(&self, element: &str, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim()),
            _ => Err(GiftiError::malformed(format!(
                "Required attribute {} not found for {}",
                name, element
            ))),
        }
    }

    fn parse_required<T: FromStr>(&self, element: &str, name: &str) -> Result<T> {
        let value = self.required(element, name)?;
        value.parse().map_err(|_| {
            GiftiError::malformed(format!("Attribute {} of {} is invalid: {}", name, element, value))
        })
    }

    fn parse_optional<T: FromStr>(&self, element: &str, name: &str) -> Result<Option<T>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value.trim().parse().map(Some).map_err(|_| {
                GiftiError::malformed(format!("Attribute {} of {} is invalid: {}", name, element, value))
            }),
        }
    }

    fn named<T>(&self, element: &str, name: &str, lookup: fn(&str) -> Option<T>) -> Result<T> {
        let value = self.required(element, name)?;
        lookup(value).ok_or_else(|| {
            GiftiError::malformed(format!("Attribute {} of {} is invalid: {}", name, element, value))
        })
    }
}

impl<S: Into<String>> FromIterator<(S, S)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        Attributes(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Receiver of document events from [`parse`].
pub trait SaxHandler {
    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()>;

    /// Text and CDATA content, in document order. May be called several
    /// times for one element.
    fn characters(&mut self, text: &str) -> Result<()>;

    fn end_element(&mut self, name: &str) -> Result<()>;

    /// Problems in the input that do not stop the parse.
    fn warning(&mut self, message: &str) {
        tracing::warn!(warning = message, "XML warning");
    }
}

#[inline(always)]
fn xml_error(position: usize, source: quick_xml::Error) -> GiftiError {
    GiftiError::Xml { position, source }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| GiftiError::malformed(format!("Invalid UTF-8 in document: {}", e)))
}

fn read_attributes(start: &BytesStart<'_>, position: usize) -> Result<Attributes> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(position, e.into()))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(position, e))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Attributes(attributes))
}

/// Tokenizes `input` and feeds the events to `handler`, stopping at the first error.
pub fn parse<R: BufRead, H: SaxHandler>(input: R, handler: &mut H) -> Result<()> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(false).expand_empty_elements(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_error(reader.buffer_position(), e))?;
        let position = reader.buffer_position();

        match event {
            Event::Start(start) => {
                let attributes = read_attributes(&start, position)?;
                depth += 1;
                handler.start_element(utf8(start.name().as_ref())?, &attributes)?;
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                handler.end_element(utf8(end.name().as_ref())?)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| xml_error(position, e))?;
                if depth > 0 {
                    handler.characters(&text)?;
                } else if !text.trim().is_empty() {
                    handler.warning("Text found outside of the root element");
                }
            }
            Event::CData(cdata) => {
                if depth > 0 {
                    handler.characters(utf8(&cdata)?)?;
                } else {
                    handler.warning("CDATA found outside of the root element");
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(GiftiError::malformed(
            "Document ended before all elements were closed",
        ));
    }
    Ok(())
}

/// Builds a [`GiftiFile`] from document events.
pub struct GiftiSaxReader {
    file: GiftiFile,
    base_dir: Option<PathBuf>,
    state: State,
    stack: Vec<State>,
    text: String,
    root_seen: bool,
    declared_arrays: Option<usize>,
    array: Option<(DataArray, ArrayDecodeParams)>,
    data_read: bool,
    md_name: String,
    md_value: String,
    label: Option<Label>,
}

impl GiftiSaxReader {
    /// Relative external binary file names are resolved against `base_dir`.
    pub fn new(base_dir: Option<&Path>) -> GiftiSaxReader {
        GiftiSaxReader {
            file: GiftiFile::new(),
            base_dir: base_dir.map(Path::to_path_buf),
            state: State::None,
            stack: Vec::new(),
            text: String::new(),
            root_seen: false,
            declared_arrays: None,
            array: None,
            data_read: false,
            md_name: String::new(),
            md_value: String::new(),
            label: None,
        }
    }

    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// The finished document. Fails if the root element never closed.
    pub fn finish(self) -> Result<GiftiFile> {
        if !self.root_seen {
            return Err(GiftiError::malformed("Document has no GIFTI element"));
        }
        if self.state != State::None {
            return Err(GiftiError::malformed(format!(
                "Document ended inside {}",
                self.state.element()
            )));
        }
        if let Some(declared) = self.declared_arrays {
            if declared != self.file.data_arrays.len() {
                tracing::warn!(
                    declared,
                    found = self.file.data_arrays.len(),
                    "NumberOfDataArrays does not match the data arrays found"
                );
            }
        }
        Ok(self.file)
    }

    fn current_array(&mut self) -> Result<&mut (DataArray, ArrayDecodeParams)> {
        self.array
            .as_mut()
            .ok_or_else(|| GiftiError::malformed("Element found outside of a DataArray"))
    }

    fn current_matrix(&mut self) -> Result<&mut TransformMatrix> {
        let (array, _) = self.current_array()?;
        array.last_matrix_mut().ok_or_else(|| {
            GiftiError::malformed("Matrix element found outside of CoordinateSystemTransformMatrix")
        })
    }

    fn start_gifti(&mut self, attributes: &Attributes) -> Result<()> {
        let version: f32 = attributes.parse_required(tags::GIFTI, attrs::VERSION)?;
        if !is_supported_version(version) {
            return Err(GiftiError::Version {
                found: version,
                min: MIN_SUPPORTED_VERSION,
                max: MAX_SUPPORTED_VERSION,
            });
        }
        self.declared_arrays =
            attributes.parse_optional(tags::GIFTI, attrs::NUMBER_OF_DATA_ARRAYS)?;
        self.file.version = version;
        self.root_seen = true;
        tracing::debug!(version, "reading GIFTI document");
        Ok(())
    }

    fn resolve_external(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn start_data_array(&mut self, attributes: &Attributes) -> Result<()> {
        const ELEMENT: &str = tags::DATA_ARRAY;

        let intent = attributes.named(ELEMENT, attrs::INTENT, Intent::from_name)?;
        let data_type = attributes.named(ELEMENT, attrs::DATA_TYPE, DataType::from_name)?;
        let encoding = attributes.named(ELEMENT, attrs::ENCODING, Encoding::from_name)?;
        let endian = attributes.named(ELEMENT, attrs::ENDIAN, Endian::from_gifti_name)?;
        let index_order = attributes.named(ELEMENT, attrs::INDEXING_ORDER, IndexOrder::from_name)?;

        // The rank is untrusted; a missing DimN ends the loop before it can run long.
        let rank: usize = attributes.parse_required(ELEMENT, attrs::DIMENSIONALITY)?;
        let mut dimensions = Vec::new();
        for i in 0..rank {
            let name = format!("{}{}", attrs::DIM_PREFIX, i);
            dimensions.push(attributes.parse_required::<usize>(ELEMENT, &name)?);
        }
        checked_byte_len(&dimensions, data_type).ok_or_else(|| {
            GiftiError::malformed(format!(
                "DataArray dimensions overflow: {:?} elements of {}",
                dimensions, data_type
            ))
        })?;

        let external_file = if encoding.is_external() {
            let name = attributes.required(ELEMENT, attrs::EXTERNAL_FILE_NAME)?;
            let offset: u64 = attributes.parse_required(ELEMENT, attrs::EXTERNAL_FILE_OFFSET)?;
            Some(ExternalFile {
                path: self.resolve_external(name),
                offset,
            })
        } else {
            None
        };

        let params = ArrayDecodeParams {
            intent,
            data_type,
            dimensions,
            encoding,
            endian,
            index_order,
            external_file,
        };
        self.array = Some((params.create_array(), params));
        self.data_read = false;
        Ok(())
    }

    fn start_label(&mut self, attributes: &Attributes) -> Result<()> {
        const ELEMENT: &str = tags::LABEL;

        let key: i32 = attributes.parse_required(ELEMENT, attrs::LABEL_KEY)?;
        let mut rgba = [1.0f32; 4];
        let channels = [attrs::LABEL_RED, attrs::LABEL_GREEN, attrs::LABEL_BLUE, attrs::LABEL_ALPHA];
        for (value, name) in rgba.iter_mut().zip(channels) {
            if let Some(v) = attributes.parse_optional(ELEMENT, name)? {
                *value = v;
            }
        }

        let mut label = Label::new(key, "", rgba);
        let x = attributes.parse_optional(ELEMENT, attrs::LABEL_X)?;
        let y = attributes.parse_optional(ELEMENT, attrs::LABEL_Y)?;
        let z = attributes.parse_optional(ELEMENT, attrs::LABEL_Z)?;
        if let (Some(x), Some(y), Some(z)) = (x, y, z) {
            label = label.with_xyz([x, y, z]);
        }
        self.label = Some(label);
        Ok(())
    }

    fn end_metadata_entry(&mut self) -> Result<()> {
        let name = std::mem::take(&mut self.md_name);
        let value = std::mem::take(&mut self.md_value);
        if name.is_empty() || value.is_empty() {
            return Ok(());
        }

        // The ended entry's parent is MetaData; its parent owns the metadata.
        if self.stack.last() == Some(&State::DataArray) {
            let (array, _) = self.current_array()?;
            array.metadata_mut().set(name, value);
        } else {
            self.file.metadata.set(name, value);
        }
        Ok(())
    }

    fn end_data_array(&mut self) -> Result<()> {
        let (mut array, params) = self
            .array
            .take()
            .ok_or_else(|| GiftiError::malformed("DataArray ended before it started"))?;

        if params.encoding.is_external() && !self.data_read {
            array.decode(&params, "")?;
        }
        array.validate_after_read();
        self.file.data_arrays.push(array);
        Ok(())
    }
}

impl SaxHandler for GiftiSaxReader {
    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        let next = transition(self.state, name)?;
        tracing::trace!(from = ?self.state, to = ?next, "start element");

        match next {
            State::Gifti => self.start_gifti(attributes)?,
            State::DataArray => self.start_data_array(attributes)?,
            State::LabelTableLabel => self.start_label(attributes)?,
            State::MetaDataEntry => {
                self.md_name.clear();
                self.md_value.clear();
            }
            State::DataArrayMatrix => {
                let (array, _) = self.current_array()?;
                array.add_matrix(TransformMatrix::identity());
            }
            _ => {}
        }

        self.stack.push(self.state);
        self.state = next;
        self.text.clear();
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.text.push_str(text);
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        let ended = self.state;
        if name != ended.element() {
            return Err(GiftiError::malformed(format!(
                "End tag \"{}\" does not match open element {}",
                name,
                ended.element()
            )));
        }
        self.state = self
            .stack
            .pop()
            .ok_or_else(|| GiftiError::malformed("State stack is empty"))?;
        tracing::trace!(from = ?ended, to = ?self.state, "end element");

        match ended {
            State::MetaDataName => self.md_name = std::mem::take(&mut self.text),
            State::MetaDataValue => self.md_value = std::mem::take(&mut self.text),
            State::MetaDataEntry => self.end_metadata_entry()?,
            State::LabelTableLabel => {
                if let Some(mut label) = self.label.take() {
                    label.name = self.text.trim().to_string();
                    self.file.label_table.insert_label(label);
                }
            }
            State::DataArrayData => {
                let text = std::mem::take(&mut self.text);
                let (array, params) = self.current_array()?;
                array.decode(params, &text)?;
                self.data_read = true;
            }
            State::DataArrayMatrixDataSpace => {
                let space = self.text.trim().to_string();
                self.current_matrix()?.data_space = space;
            }
            State::DataArrayMatrixTransformedSpace => {
                let space = self.text.trim().to_string();
                self.current_matrix()?.transformed_space = space;
            }
            State::DataArrayMatrixData => {
                let matrix = TransformMatrix::parse_row_major(&self.text)?;
                self.current_matrix()?.matrix = matrix;
            }
            State::DataArray => self.end_data_array()?,
            _ => {}
        }
        Ok(())
    }
}

fn read_document<R: BufRead>(input: R, base_dir: Option<&Path>) -> Result<GiftiFile> {
    let mut handler = GiftiSaxReader::new(base_dir);
    parse(input, &mut handler)?;
    let mut file = handler.finish()?;
    file.assign_default_map_names();
    file.clear_modified();
    Ok(file)
}

impl GiftiFile {
    /// Reads a GIFTI document from disk. External binary files named with
    /// relative paths are looked up next to it.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<GiftiFile> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GiftiError::io("open GIFTI file", path, e))?;
        let mut gifti = read_document(BufReader::new(file), path.parent())?;
        gifti.file_name = Some(path.to_path_buf());
        Ok(gifti)
    }

    /// Reads a GIFTI document from `input`. Relative external binary file
    /// names resolve against the working directory.
    pub fn read_from<R: BufRead>(input: R) -> Result<GiftiFile> {
        read_document(input, None)
    }
}
