use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use xmlbind::schema::{FieldDecl, ModelDecl};
use xmlbind::{Binder, IntKind, Record, Result, ScalarType, XmlModel};

#[derive(Debug, Clone)]
struct Line {
    sku: String,
    quantity: u32,
    price: f64,
}

impl XmlModel for Line {
    fn declare() -> ModelDecl {
        ModelDecl::new("Line")
            .tag("line")
            .field(FieldDecl::attribute("sku", ScalarType::String))
            .field(FieldDecl::element("quantity", ScalarType::Integer(IntKind::U32)))
            .field(FieldDecl::element("price", ScalarType::Float))
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            sku: record.take("sku")?,
            quantity: record.take("quantity")?,
            price: record.take("price")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("sku", self.sku.as_str())
            .with("quantity", self.quantity)
            .with("price", self.price)
    }
}

#[derive(Debug, Clone)]
struct Order {
    id: u64,
    customer: String,
    lines: Vec<Line>,
}

impl XmlModel for Order {
    fn declare() -> ModelDecl {
        ModelDecl::new("Order")
            .tag("order")
            .field(FieldDecl::attribute("id", ScalarType::Integer(IntKind::U64)))
            .field(FieldDecl::wrapped("customer", "customer/name", ScalarType::String))
            .field(FieldDecl::model::<Line>("lines").collection().wrap("lines"))
    }

    fn from_record(mut record: Record) -> Result<Self> {
        Ok(Self {
            id: record.take("id")?,
            customer: record.take("customer")?,
            lines: record.take_models("lines")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("customer", self.customer.as_str())
            .with_models("lines", &self.lines)
    }
}

fn order(lines: usize) -> Order {
    Order {
        id: 42,
        customer: "Acme B.V.".to_string(),
        lines: (0..lines)
            .map(|i| Line {
                sku: format!("SKU-{i:05}"),
                quantity: (i % 7) as u32 + 1,
                price: 2.5 * i as f64,
            })
            .collect(),
    }
}

fn bench_serialize(c: &mut Criterion) {
    let binder = Binder::new();
    let order = order(100);
    c.bench_function("serialize_order_100_lines", |b| {
        b.iter(|| binder.to_xml(black_box(&order)))
    });
}

fn bench_deserialize(c: &mut Criterion) {
    let binder = Binder::new();
    let Ok(xml) = binder.to_xml_string(&order(100)) else {
        return;
    };
    c.bench_function("deserialize_order_100_lines", |b| {
        b.iter(|| binder.from_xml_str::<Order>(black_box(&xml)))
    });
}

fn bench_schema_lookup(c: &mut Criterion) {
    let binder = Binder::new();
    c.bench_function("cached_schema_lookup", |b| {
        b.iter(|| binder.schema::<Order>())
    });
}

criterion_group!(benches, bench_serialize, bench_deserialize, bench_schema_lookup);
criterion_main!(benches);
