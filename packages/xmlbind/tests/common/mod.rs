//! Models and helpers shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use xmlbind::schema::{FieldDecl, ModelDecl};
use xmlbind::{IntKind, Record, Result, ScalarType, XmlModel, XmlNode};

/// Load fixture file content.
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Install a tracing subscriber honouring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub version: u16,
    pub title: String,
    pub owner: Person,
    pub books: Vec<Book>,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub extension: Option<XmlNode>,
}

impl XmlModel for Catalog {
    fn declare() -> ModelDecl {
        ModelDecl::new("Catalog")
            .tag("catalog")
            .field(FieldDecl::attribute("version", ScalarType::Integer(IntKind::U16)))
            .field(FieldDecl::element("title", ScalarType::String))
            .field(FieldDecl::model::<Person>("owner"))
            .field(FieldDecl::model::<Book>("books").collection().wrap("books"))
            .field(
                FieldDecl::element("tags", ScalarType::String)
                    .tag("tag")
                    .collection()
                    .optional(),
            )
            .field(FieldDecl::element("note", ScalarType::String).optional())
            .field(FieldDecl::raw("extension").optional())
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            version: record.take("version")?,
            title: record.take("title")?,
            owner: record.take_model("owner")?,
            books: record.take_models("books")?,
            tags: record.take("tags")?,
            note: record.take("note")?,
            extension: record.take("extension")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("version", self.version)
            .with("title", self.title.as_str())
            .with_model("owner", &self.owner)
            .with_models("books", &self.books)
            .with("tags", self.tags.clone())
            .with("note", self.note.clone())
            .with("extension", self.extension.clone())
    }
}

/// Bound without a declared tag: the element is named after the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: u32,
    pub name: String,
    pub city: String,
    pub zip: Option<String>,
}

impl XmlModel for Person {
    fn declare() -> ModelDecl {
        ModelDecl::new("Person")
            .field(FieldDecl::attribute("id", ScalarType::Integer(IntKind::U32)))
            .field(FieldDecl::element("name", ScalarType::String))
            .field(FieldDecl::wrapped("city", "address/city", ScalarType::String))
            .field(
                FieldDecl::attribute("zip", ScalarType::String)
                    .wrap("address")
                    .optional(),
            )
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            id: record.take("id")?,
            name: record.take("name")?,
            city: record.take("city")?,
            zip: record.take("zip")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("city", self.city.as_str())
            .with("zip", self.zip.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: u32,
    pub lang: String,
    pub title: String,
    pub price: Option<f64>,
    pub published: Option<NaiveDate>,
}

impl XmlModel for Book {
    fn declare() -> ModelDecl {
        ModelDecl::new("Book")
            .tag("book")
            .field(FieldDecl::attribute("id", ScalarType::Integer(IntKind::U32)))
            .field(FieldDecl::attribute("lang", ScalarType::String).default("en"))
            .field(FieldDecl::element("title", ScalarType::String))
            .field(FieldDecl::element("price", ScalarType::Float).optional())
            .field(FieldDecl::element("published", ScalarType::Date).optional())
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            id: record.take("id")?,
            lang: record.take("lang")?,
            title: record.take("title")?,
            price: record.take("price")?,
            published: record.take("published")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("lang", self.lang.as_str())
            .with("title", self.title.as_str())
            .with("price", self.price)
            .with("published", self.published)
    }
}

/// Recursive model: replies are comments themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub replies: Vec<Comment>,
}

impl XmlModel for Comment {
    fn declare() -> ModelDecl {
        ModelDecl::new("Comment")
            .tag("comment")
            .field(FieldDecl::attribute("author", ScalarType::String))
            .field(FieldDecl::element("body", ScalarType::String))
            .field(
                FieldDecl::model::<Comment>("replies")
                    .tag("comment")
                    .collection()
                    .optional(),
            )
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            author: record.take("author")?,
            body: record.take("body")?,
            replies: record.take_models("replies")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("author", self.author.as_str())
            .with("body", self.body.as_str())
            .with_models("replies", &self.replies)
    }
}

/// Only wrapped, optional fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shipment {
    pub carrier: Option<String>,
    pub code: Option<String>,
}

impl XmlModel for Shipment {
    fn declare() -> ModelDecl {
        ModelDecl::new("Shipment")
            .tag("shipment")
            .field(FieldDecl::wrapped("carrier", "meta/carrier", ScalarType::String).optional())
            .field(
                FieldDecl::attribute("code", ScalarType::String)
                    .wrap("meta")
                    .optional(),
            )
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            carrier: record.take("carrier")?,
            code: record.take("code")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("carrier", self.carrier.clone())
            .with("code", self.code.clone())
    }
}

/// Element whose text may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Memo {
    pub to: String,
    pub cc: String,
}

impl XmlModel for Memo {
    fn declare() -> ModelDecl {
        ModelDecl::new("Memo")
            .tag("memo")
            .field(FieldDecl::element("to", ScalarType::String))
            .field(FieldDecl::element("cc", ScalarType::String))
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            to: record.take("to")?,
            cc: record.take("cc")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("to", self.to.as_str())
            .with("cc", self.cc.as_str())
    }
}

pub fn sample_catalog() -> Catalog {
    Catalog {
        version: 1,
        title: "Autumn".to_string(),
        owner: Person {
            id: 3,
            name: "Grace".to_string(),
            city: "Delft".to_string(),
            zip: None,
        },
        books: vec![Book {
            id: 9,
            lang: "en".to_string(),
            title: "Neuromancer".to_string(),
            price: Some(7.25),
            published: NaiveDate::from_ymd_opt(1984, 7, 1),
        }],
        tags: vec!["cyberpunk".to_string()],
        note: Some("fragile & heavy".to_string()),
        extension: None,
    }
}
