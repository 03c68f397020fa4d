//! The trait implemented by bound model types.

use crate::error::Result;
use crate::schema::ModelDecl;
use crate::value::Record;

/// A Rust type with a declared XML shape.
///
/// ```
/// use xmlbind::schema::{FieldDecl, ModelDecl};
/// use xmlbind::validate::ScalarType;
/// use xmlbind::{Record, Result, XmlModel};
///
/// struct Greeting {
///     lang: String,
///     text: String,
/// }
///
/// impl XmlModel for Greeting {
///     fn declare() -> ModelDecl {
///         ModelDecl::new("Greeting")
///             .tag("greeting")
///             .field(FieldDecl::attribute("lang", ScalarType::String))
///             .field(FieldDecl::text("text", ScalarType::String))
///     }
///
///     fn from_record(mut record: Record) -> Result<Self> {
///         Ok(Self {
///             lang: record.take("lang")?,
///             text: record.take("text")?,
///         })
///     }
///
///     fn to_record(&self) -> Record {
///         Record::new()
///             .with("lang", self.lang.as_str())
///             .with("text", self.text.as_str())
///     }
/// }
///
/// let greeting: Greeting = xmlbind::from_xml_str(r#"<greeting lang="nl">Hallo</greeting>"#).unwrap();
/// assert_eq!(greeting.lang, "nl");
/// assert_eq!(xmlbind::to_xml_string(&greeting).unwrap(), r#"<greeting lang="nl">Hallo</greeting>"#);
/// ```
pub trait XmlModel: Sized + 'static {
    /// The model's binding declaration.
    fn declare() -> ModelDecl;

    /// Build an instance from deserialized field values.
    ///
    /// # Errors
    /// Returns a field error when a value does not convert to the field type.
    fn from_record(record: Record) -> Result<Self>;

    /// Field values of this instance. Absent optional fields may be left out.
    fn to_record(&self) -> Record;
}

impl Record {
    /// Builder-style insert of a nested model.
    #[must_use]
    pub fn with_model<T: XmlModel>(self, name: &str, model: &T) -> Self {
        self.with(name, model.to_record())
    }

    /// Builder-style insert of an optional nested model.
    #[must_use]
    pub fn with_optional_model<T: XmlModel>(self, name: &str, model: Option<&T>) -> Self {
        self.with(name, model.map(T::to_record))
    }

    /// Builder-style insert of a collection of nested models.
    #[must_use]
    pub fn with_models<T: XmlModel>(self, name: &str, models: &[T]) -> Self {
        self.with(name, models.iter().map(T::to_record).collect::<Vec<_>>())
    }

    /// Remove a nested model field and rebuild the model.
    ///
    /// # Errors
    /// Errors of the nested model are reported under `name`.
    pub fn take_model<T: XmlModel>(&mut self, name: &str) -> Result<T> {
        let record: Record = self.take(name)?;
        T::from_record(record).map_err(|e| e.prefixed(name))
    }

    /// Remove an optional nested model field and rebuild the model.
    ///
    /// # Errors
    /// Errors of the nested model are reported under `name`.
    pub fn take_optional_model<T: XmlModel>(&mut self, name: &str) -> Result<Option<T>> {
        let record: Option<Record> = self.take(name)?;
        record
            .map(T::from_record)
            .transpose()
            .map_err(|e| e.prefixed(name))
    }

    /// Remove a collection of nested models and rebuild each one.
    ///
    /// # Errors
    /// Errors of an item are reported under `name[index]`.
    pub fn take_models<T: XmlModel>(&mut self, name: &str) -> Result<Vec<T>> {
        let records: Vec<Record> = self.take(name)?;
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                T::from_record(record).map_err(|e| e.prefixed(&format!("{name}[{i}]")))
            })
            .collect()
    }
}
