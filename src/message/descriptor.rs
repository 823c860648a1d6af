// src/message/descriptor.rs

/// What to emit for op1 / op2, parsed once from a `(type, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDescriptor {
    /// `orig` / `pay`: the event that created the entry.
    Original,
    /// `payl`: the most recent event for the key.
    Latest,
    /// `nothing` / `nul`: emit nothing.
    Nothing,
    Flow(String),
    Global(String),
    Env(String),
    Date(DateFormat),
    Json(String),
    Bin(String),
    Bool(String),
    Num(String),
    /// `str` and any unrecognised tag.
    Str(String),
}

/// Sub-value of the `date` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFormat {
    /// Empty value: epoch milliseconds.
    EpochMillis,
    /// `iso`: ISO-8601 UTC string.
    Iso,
    /// `date`: a date/time object.
    Object,
    /// Anything else: parsed as an integer when the message is built.
    Raw(String),
}

impl DateFormat {
    pub fn from_value(value: &str) -> Self {
        match value {
            "" => DateFormat::EpochMillis,
            "iso" => DateFormat::Iso,
            "date" => DateFormat::Object,
            other => DateFormat::Raw(other.to_string()),
        }
    }
}

impl OutputDescriptor {
    pub fn from_typed(type_tag: &str, value: &str) -> Self {
        let value = value.to_string();
        match type_tag.trim() {
            "orig" | "pay" => OutputDescriptor::Original,
            "payl" => OutputDescriptor::Latest,
            "nothing" | "nul" => OutputDescriptor::Nothing,
            "flow" => OutputDescriptor::Flow(value),
            "global" => OutputDescriptor::Global(value),
            "env" => OutputDescriptor::Env(value),
            "date" => OutputDescriptor::Date(DateFormat::from_value(&value)),
            "json" => OutputDescriptor::Json(value),
            "bin" => OutputDescriptor::Bin(value),
            "bool" => OutputDescriptor::Bool(value),
            "num" => OutputDescriptor::Num(value),
            _ => OutputDescriptor::Str(value),
        }
    }
}
