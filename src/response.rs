use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::field::{CatalogError, FieldCatalog, FieldType};

/// Wire format of Quickbase date-time values.
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A single cell value after decoding from JSON.
///
/// `Int` and `Float` are kept distinct so that `round_ints` observably turns
/// a float like `10.0` into the integer `10`. Structured values produced by
/// `convert_type` get their own variants; anything the reshaping pipeline
/// does not touch (nested objects, arrays) rides along in `Json`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Json(Value),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl CellValue {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => CellValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => CellValue::Text(s),
            other => CellValue::Json(other),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::from(*b),
            CellValue::Int(i) => Value::from(*i),
            CellValue::Float(f) => Value::from(*f),
            CellValue::Text(s) => Value::from(s.clone()),
            CellValue::DateTime(dt) => {
                Value::from(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            CellValue::Date(d) => Value::from(d.to_string()),
            CellValue::Json(v) => v.clone(),
        }
    }

    /// Rendering used when a cell value becomes the key of a keyed record
    /// collection.
    fn key_string(&self) -> String {
        match self {
            CellValue::Null => "null".to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            CellValue::Date(d) => d.to_string(),
            CellValue::Json(v) => v.to_string(),
        }
    }
}

/// One record cell, either still in the API's `{"value": V}` envelope or
/// unwrapped to the bare value by `denest`.
///
/// Which form is in force is not decided per cell: the envelope tracks it
/// globally in [`CellShape`], and every field-touching operation branches on
/// that state. A cell that disagrees with the tracked shape is the mixed-state
/// bug class the engine reports as [`TransformError::ShapeMismatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Wrapped(CellValue),
    Bare(CellValue),
}

impl Cell {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut map) if map.contains_key("value") => {
                let inner = map.remove("value").unwrap_or(Value::Null);
                Cell::Wrapped(CellValue::from_json(inner))
            }
            other => Cell::Bare(CellValue::from_json(other)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Wrapped(v) => {
                let mut map = serde_json::Map::with_capacity(1);
                map.insert("value".to_string(), v.to_json());
                Value::Object(map)
            }
            Cell::Bare(v) => v.to_json(),
        }
    }

    /// Consume the cell per the tracked shape.
    fn take_as(self, shape: CellShape) -> Result<CellValue, TransformError> {
        match (shape, self) {
            (CellShape::Wrapped, Cell::Wrapped(v)) | (CellShape::Bare, Cell::Bare(v)) => Ok(v),
            _ => Err(TransformError::ShapeMismatch),
        }
    }

    /// Inner value regardless of form. Only used on the orient label-fallback
    /// path, where label-keyed records carry bare values by construction.
    fn into_inner(self) -> CellValue {
        match self {
            Cell::Wrapped(v) | Cell::Bare(v) => v,
        }
    }
}

fn cell_value_mut(cell: &mut Cell, shape: CellShape) -> Result<&mut CellValue, TransformError> {
    match (shape, cell) {
        (CellShape::Wrapped, Cell::Wrapped(v)) | (CellShape::Bare, Cell::Bare(v)) => Ok(v),
        _ => Err(TransformError::ShapeMismatch),
    }
}

/// A record as returned by the records-query endpoint: field ids (as strings,
/// exactly as they arrive on the wire) mapped to cells.
pub type Record = BTreeMap<String, Cell>;

/// Top-level shape of the record data.
///
/// `Sequence` is the API's native list of records; `Keyed` is produced by
/// `orient`, which pops one field out of each record and uses its value as
/// the map key. The transition is one-way.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordCollection {
    Sequence(Vec<Record>),
    Keyed(BTreeMap<String, Record>),
}

impl RecordCollection {
    pub fn len(&self) -> usize {
        match self {
            RecordCollection::Sequence(records) => records.len(),
            RecordCollection::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Box<dyn Iterator<Item = &Record> + '_> {
        match self {
            RecordCollection::Sequence(records) => Box::new(records.iter()),
            RecordCollection::Keyed(map) => Box::new(map.values()),
        }
    }

    pub fn records_mut(&mut self) -> Box<dyn Iterator<Item = &mut Record> + '_> {
        match self {
            RecordCollection::Sequence(records) => Box::new(records.iter_mut()),
            RecordCollection::Keyed(map) => Box::new(map.values_mut()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            RecordCollection::Sequence(records) => Value::Array(
                records
                    .iter()
                    .map(|r| {
                        Value::Object(r.iter().map(|(k, c)| (k.clone(), c.to_json())).collect())
                    })
                    .collect(),
            ),
            RecordCollection::Keyed(map) => Value::Object(
                map.iter()
                    .map(|(key, r)| {
                        (
                            key.clone(),
                            Value::Object(
                                r.iter().map(|(k, c)| (k.clone(), c.to_json())).collect(),
                            ),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

impl Default for RecordCollection {
    fn default() -> Self {
        RecordCollection::Sequence(Vec::new())
    }
}

/// Paging metadata attached to a records-query response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub total_records: u64,
    pub num_records: u64,
    pub num_fields: u64,
    pub skip: u64,
}

/// Global cell form of an envelope: `Wrapped` until `denest` runs, `Bare`
/// afterwards. Consulted by every field-touching operation instead of
/// scanning the operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellShape {
    Wrapped,
    Bare,
}

/// Name of a reshaping operation, as recorded in the operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Denest,
    Orient,
    Transform,
    ConvertType,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Denest => "denest",
            Operation::Orient => "orient",
            Operation::Transform => "transform",
            Operation::ConvertType => "convert_type",
        }
    }
}

/// Record-collection orientation accepted by [`QueryResponse::orient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Orientation {
    Records,
    Other(String),
}

impl From<&str> for Orientation {
    fn from(s: &str) -> Self {
        match s {
            "records" => Orientation::Records,
            other => Orientation::Other(other.to_string()),
        }
    }
}

/// Transformation kind accepted by [`QueryResponse::transform`]. Unknown
/// kinds are carried in `Other` and treated as a no-op; callers probe
/// transformation availability that way, so `Other` must not be an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformKind {
    Labels,
    IntRound,
    Other(String),
}

impl From<&str> for TransformKind {
    fn from(s: &str) -> Self {
        match s {
            "labels" => TransformKind::Labels,
            "intround" => TransformKind::IntRound,
            other => TransformKind::Other(other.to_string()),
        }
    }
}

/// Target type accepted by [`QueryResponse::convert_type`]. `Currency`
/// covers both the `"currency"` and `"numeric currency"` spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertKind {
    DateTime,
    Currency,
    Other(String),
}

impl From<&str> for ConvertKind {
    fn from(s: &str) -> Self {
        match s {
            "datetime" => ConvertKind::DateTime,
            "currency" | "numeric currency" => ConvertKind::Currency,
            other => ConvertKind::Other(other.to_string()),
        }
    }
}

/// Options for [`QueryResponse::convert_type`].
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Currency symbol/prefix, required for `ConvertKind::Currency`.
    pub fmt: Option<String>,
    /// strftime-style format used for `date`-typed fields.
    pub datestring: Option<String>,
}

/// Errors raised by the response reshaping operations.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("data is already denested; cells are in bare form")]
    AlreadyDenested,

    #[error("{0} is not a valid orientation")]
    InvalidOrientation(String),

    #[error("missing required \"key\" argument for records orientation")]
    MissingKey,

    #[error("orientation key must be an integer field id, got {0}")]
    KeyType(Value),

    #[error("data is not a record sequence; records orientation can only be applied once")]
    NotASequence,

    #[error("record key {key:?} not found, even after falling back to label {label:?}")]
    RecordKeyNotFound { key: String, label: String },

    #[error("try transforming the data before applying additional methods; data is empty")]
    EmptyData,

    #[error("the {kind:?} transformation is retired; use {replacement}() instead")]
    DeprecatedTransform {
        kind: String,
        replacement: &'static str,
    },

    #[error("record key {0:?} is not a field id")]
    RecordKeyNotAFieldId(String),

    #[error("record cell does not match the envelope's tracked cell shape; denest state and record data have diverged")]
    ShapeMismatch,

    #[error("invalid date/time value {value:?}: {source}")]
    DateTimeFormat {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("currency conversion requires a \"fmt\" option")]
    MissingCurrencyFormat,

    #[error("invalid response envelope: {0}")]
    InvalidEnvelope(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A decoded records-query response plus the state needed to reshape it.
///
/// Created once from a decoded API payload (or a test fixture), then mutated
/// in place by a chain of reshaping calls. Operations are not transactional:
/// a failure mid-way leaves the envelope partially mutated, and no internal
/// locking is provided — callers needing the original must clone first, and
/// concurrent mutation from multiple threads must be serialized by the
/// caller.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub data: RecordCollection,
    pub fields: FieldCatalog,
    pub metadata: Metadata,
    operations: Vec<Operation>,
    cell_shape: CellShape,
}

impl Default for QueryResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryResponse {
    pub fn new() -> Self {
        Self {
            data: RecordCollection::default(),
            fields: FieldCatalog::default(),
            metadata: Metadata::default(),
            operations: Vec::new(),
            cell_shape: CellShape::Wrapped,
        }
    }

    /// Decode a records-query payload of shape
    /// `{"data": [...], "fields": [...], "metadata": {...}}`.
    ///
    /// Metadata inconsistencies (`numFields` not matching the field list,
    /// more records than `totalRecords`) are logged, not rejected.
    pub fn from_value(payload: Value) -> Result<Self, TransformError> {
        let mut envelope = match payload {
            Value::Object(map) => map,
            other => {
                return Err(TransformError::InvalidEnvelope(format!(
                    "expected a JSON object, got {other}"
                )))
            }
        };

        let fields: FieldCatalog = match envelope.remove("fields") {
            Some(v) => serde_json::from_value(v)
                .map_err(|e| TransformError::InvalidEnvelope(format!("fields: {e}")))?,
            None => FieldCatalog::default(),
        };

        let metadata: Metadata = match envelope.remove("metadata") {
            Some(v) => serde_json::from_value(v)
                .map_err(|e| TransformError::InvalidEnvelope(format!("metadata: {e}")))?,
            None => Metadata::default(),
        };

        let data = match envelope.remove("data") {
            Some(Value::Array(rows)) => {
                let mut records = Vec::with_capacity(rows.len());
                for row in rows {
                    records.push(record_from_json(row)?);
                }
                RecordCollection::Sequence(records)
            }
            Some(other) => {
                return Err(TransformError::InvalidEnvelope(format!(
                    "data must be an array of records, got {other}"
                )))
            }
            None => RecordCollection::default(),
        };

        if metadata.num_fields as usize != fields.len() {
            warn!(
                "metadata.numFields ({}) does not match the field list length ({})",
                metadata.num_fields,
                fields.len()
            );
        }
        if data.len() as u64 > metadata.total_records {
            warn!(
                "response carries {} records but metadata.totalRecords is {}",
                data.len(),
                metadata.total_records
            );
        }

        Ok(Self {
            data,
            fields,
            metadata,
            operations: Vec::new(),
            cell_shape: CellShape::Wrapped,
        })
    }

    /// Structural dump of the envelope's current in-memory shape.
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(3);
        map.insert("data".to_string(), self.data.to_json());
        map.insert(
            "fields".to_string(),
            serde_json::to_value(&self.fields).unwrap_or(Value::Null),
        );
        map.insert(
            "metadata".to_string(),
            serde_json::to_value(&self.metadata).unwrap_or(Value::Null),
        );
        Value::Object(map)
    }

    /// Ordered log of the reshaping operations that have run.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn cell_shape(&self) -> CellShape {
        self.cell_shape
    }

    /// Unwrap every cell from `{"value": V}` to the bare `V`, for both the
    /// sequence and keyed collection shapes.
    ///
    /// Not idempotent: calling it on already-bare data is a precondition
    /// fault.
    pub fn denest(&mut self) -> Result<&mut Self, TransformError> {
        if self.cell_shape == CellShape::Bare {
            return Err(TransformError::AlreadyDenested);
        }
        for record in self.data.records_mut() {
            for cell in record.values_mut() {
                if let Cell::Wrapped(v) = cell {
                    *cell = Cell::Bare(std::mem::take(v));
                }
            }
        }
        self.cell_shape = CellShape::Bare;
        self.operations.push(Operation::Denest);
        Ok(self)
    }

    /// Re-orient the record sequence into a map keyed by the given field's
    /// value, removing that field from each record.
    ///
    /// Only `Orientation::Records` is supported and `key` must be an integer
    /// field id (passed as a JSON value because field ids arrive as numeric
    /// strings on the wire). If the key field is missing from a record the
    /// engine makes one fallback attempt: resolve the fid in the catalog and
    /// retry the pop with the field's label, for records keyed by label.
    ///
    /// Duplicate key values overwrite, last record wins. The conversion is
    /// one-way: on already-keyed data this fails.
    pub fn orient(
        &mut self,
        mode: Orientation,
        key: Option<Value>,
    ) -> Result<&mut Self, TransformError> {
        match mode {
            Orientation::Records => {}
            Orientation::Other(name) => return Err(TransformError::InvalidOrientation(name)),
        }
        let key = key.ok_or(TransformError::MissingKey)?;
        let fid = key.as_i64().ok_or(TransformError::KeyType(key.clone()))?;
        let selector = fid.to_string();

        let records = match &mut self.data {
            RecordCollection::Sequence(records) => std::mem::take(records),
            RecordCollection::Keyed(_) => return Err(TransformError::NotASequence),
        };

        let mut keyed = BTreeMap::new();
        for mut record in records {
            let key_value = match record.remove(&selector) {
                Some(cell) => cell.take_as(self.cell_shape)?,
                None => {
                    let field = self.fields.lookup_by_id(fid)?;
                    warn!(
                        "key field {selector} not present in record, retrying with label {:?}",
                        field.label
                    );
                    record
                        .remove(&field.label)
                        .ok_or_else(|| TransformError::RecordKeyNotFound {
                            key: selector.clone(),
                            label: field.label.clone(),
                        })?
                        .into_inner()
                }
            };
            keyed.insert(key_value.key_string(), record);
        }

        self.data = RecordCollection::Keyed(keyed);
        self.operations.push(Operation::Orient);
        Ok(self)
    }

    /// Apply a named transformation to the data.
    ///
    /// `Labels` rebuilds a fresh record sequence keyed by field label;
    /// `IntRound` is retired in favor of [`round_ints`](Self::round_ints);
    /// unknown kinds return unchanged.
    pub fn transform(&mut self, kind: TransformKind) -> Result<&mut Self, TransformError> {
        match kind {
            TransformKind::Labels => self.transform_labels()?,
            TransformKind::IntRound => {
                return Err(TransformError::DeprecatedTransform {
                    kind: "intround".to_string(),
                    replacement: "round_ints",
                })
            }
            TransformKind::Other(_) => return Ok(self),
        }
        self.operations.push(Operation::Transform);
        Ok(self)
    }

    fn transform_labels(&mut self) -> Result<(), TransformError> {
        if self.data.is_empty() {
            return Err(TransformError::EmptyData);
        }

        let taken = std::mem::take(&mut self.data);
        let records: Vec<Record> = match taken {
            RecordCollection::Sequence(records) => records,
            // A prior keyed orientation is not preserved; apply labels
            // before orient.
            RecordCollection::Keyed(map) => map.into_values().collect(),
        };

        let mut relabeled = Vec::with_capacity(records.len());
        for record in records {
            let mut out = Record::new();
            for (key, cell) in record {
                let fid = key
                    .parse::<i64>()
                    .map_err(|_| TransformError::RecordKeyNotAFieldId(key.clone()))?;
                let label = self.fields.lookup_by_id(fid)?.label.clone();
                let cell = match self.cell_shape {
                    // Null cells keep the wrapped form so downstream null
                    // checks still see a consistent shape.
                    CellShape::Wrapped => match cell {
                        Cell::Wrapped(CellValue::Null) => Cell::Wrapped(CellValue::Null),
                        Cell::Wrapped(v) => Cell::Bare(v),
                        bare => bare,
                    },
                    CellShape::Bare => cell,
                };
                out.insert(label, cell);
            }
            relabeled.push(out);
        }

        self.data = RecordCollection::Sequence(relabeled);
        Ok(())
    }

    /// Round every numeric-typed field's value to an integer, in place, for
    /// both wrapped and bare data. Non-numeric fields are untouched.
    ///
    /// Unlike the other reshaping operations this does not record itself in
    /// the operation log; the asymmetry is long-standing observable behavior
    /// and is pinned by a test.
    pub fn round_ints(&mut self) -> Result<&mut Self, TransformError> {
        let Self {
            ref fields,
            ref mut data,
            cell_shape,
            ..
        } = *self;
        for field in fields.descriptors() {
            if field.field_type != FieldType::Numeric {
                continue;
            }
            let key = field.id.to_string();
            for record in data.records_mut() {
                if let Some(cell) = record.get_mut(&key) {
                    let value = cell_value_mut(cell, cell_shape)?;
                    if let CellValue::Float(f) = *value {
                        *value = CellValue::Int(f.round() as i64);
                    }
                }
            }
        }
        Ok(self)
    }

    /// Convert values of one semantic field type into a structured form:
    /// date-time strings into [`chrono`] date-times, or numeric-currency
    /// numbers into formatted currency strings. Unknown kinds return
    /// unchanged.
    pub fn convert_type(
        &mut self,
        kind: ConvertKind,
        options: ConvertOptions,
    ) -> Result<&mut Self, TransformError> {
        match kind {
            ConvertKind::DateTime => self.convert_datetime(&options)?,
            ConvertKind::Currency => {
                let fmt = options
                    .fmt
                    .as_deref()
                    .ok_or(TransformError::MissingCurrencyFormat)?;
                self.convert_currency(fmt)?;
            }
            ConvertKind::Other(_) => return Ok(self),
        }
        self.operations.push(Operation::ConvertType);
        Ok(self)
    }

    fn convert_datetime(&mut self, options: &ConvertOptions) -> Result<(), TransformError> {
        let Self {
            ref fields,
            ref mut data,
            cell_shape,
            ..
        } = *self;
        for field in fields.descriptors() {
            let key = field.id.to_string();
            match field.field_type {
                FieldType::DateTime => {
                    for record in data.records_mut() {
                        if let Some(cell) = record.get_mut(&key) {
                            let value = cell_value_mut(cell, cell_shape)?;
                            if let CellValue::Text(s) = value {
                                let parsed = parse_datetime(s)?;
                                *value = CellValue::DateTime(parsed);
                            }
                        }
                    }
                }
                FieldType::Date => {
                    // Date fields only convert when the caller supplies the
                    // expected format.
                    let Some(datestring) = options.datestring.as_deref() else {
                        continue;
                    };
                    for record in data.records_mut() {
                        if let Some(cell) = record.get_mut(&key) {
                            let value = cell_value_mut(cell, cell_shape)?;
                            if let CellValue::Text(s) = value {
                                let parsed = NaiveDate::parse_from_str(s, datestring).map_err(
                                    |source| TransformError::DateTimeFormat {
                                        value: s.clone(),
                                        source,
                                    },
                                )?;
                                *value = CellValue::Date(parsed);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn convert_currency(&mut self, fmt: &str) -> Result<(), TransformError> {
        let Self {
            ref fields,
            ref mut data,
            cell_shape,
            ..
        } = *self;
        for field in fields.descriptors() {
            if field.field_type != FieldType::NumericCurrency {
                continue;
            }
            let key = field.id.to_string();
            for record in data.records_mut() {
                if let Some(cell) = record.get_mut(&key) {
                    let value = cell_value_mut(cell, cell_shape)?;
                    let amount = match *value {
                        CellValue::Int(i) => Some(i as f64),
                        CellValue::Float(f) => Some(f),
                        _ => None,
                    };
                    if let Some(amount) = amount {
                        *value = CellValue::Text(format_currency(amount, fmt));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Serialize for QueryResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

fn record_from_json(row: Value) -> Result<Record, TransformError> {
    match row {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, Cell::from_json(v)))
            .collect()),
        other => Err(TransformError::InvalidEnvelope(format!(
            "record must be a JSON object, got {other}"
        ))),
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, TransformError> {
    let naive = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map_err(|source| {
        TransformError::DateTimeFormat {
            value: s.to_string(),
            source,
        }
    })?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Render an amount as `fmt` + two-decimal value with thousands separators,
/// e.g. `1234567.5` with `"$"` becomes `"$1,234,567.50"`.
fn format_currency(amount: f64, fmt: &str) -> String {
    let negative = amount < 0.0;
    let rendered = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some(parts) => parts,
        None => (rendered.as_str(), "00"),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{fmt}{sign}{grouped}.{frac_part}")
}
