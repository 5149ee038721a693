use serde_json::Value;

/// Value carried by a field of an [`Item`].
///
/// XML fields are always [`Value::String`] holding the inner markup of the
/// field element. JSON fields hold whatever the decoder produced.
pub type FieldValue = Value;

/// One importable unit read from a document.
///
/// Fields keep their document order. Names may repeat (XML allows several
/// children with the same tag); every occurrence is assigned in turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    fields: Vec<(String, FieldValue)>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        self.fields.push((name.into(), value));
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the first value of the field named `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, FieldValue)> for Item {
    fn from_iter<I: IntoIterator<Item = (S, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

impl IntoIterator for Item {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Ordered sequence of items parsed from one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    items: Vec<Item>,
}

impl Document {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for Document {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Validation messages grouped by attribute, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<A: Into<String>, M: Into<String>>(&mut self, attribute: A, message: M) {
        let attribute = attribute.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| *name == attribute) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((attribute, vec![message])),
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of attributes carrying at least one message.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A persisted domain object built from one item.
///
/// The importer creates a fresh record per item, assigns every field it can,
/// then asks the record to save itself.
pub trait Record {
    /// Assigns `value` to the settable property `field`.
    ///
    /// Returns `false` without side effects when the record has no such
    /// settable property.
    fn try_set(&mut self, field: &str, value: FieldValue) -> bool;

    /// Validates and persists the record. Returns `false` when it was not saved.
    fn save(&mut self) -> bool;

    /// Errors collected by the last failed [`Record::save`].
    fn errors(&self) -> ValidationErrors;
}
