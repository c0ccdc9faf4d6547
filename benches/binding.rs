//! Render and parse benchmarks.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use xsdbind::types::builtins::{DecimalType, IntegerType, StringType};
use xsdbind::{
    Arguments, ComplexType, Element, ElementProperty, ParseConfig, QName, Type, Value,
};

const NS: &str = "urn:bench";

fn order_line() -> Arc<ComplexType> {
    Arc::new(
        ComplexType::new(Some(QName::namespaced(NS, "OrderLine"))).with_elements(vec![
            ElementProperty::new(QName::namespaced(NS, "sku"), Type::simple(StringType::token())).into(),
            ElementProperty::new(QName::namespaced(NS, "quantity"), Type::simple(IntegerType::int())).into(),
            ElementProperty::new(QName::namespaced(NS, "price"), Type::simple(DecimalType)).into(),
        ]),
    )
}

fn order(line: &Arc<ComplexType>) -> Arc<ComplexType> {
    Arc::new(
        ComplexType::new(Some(QName::namespaced(NS, "Order"))).with_elements(vec![
            ElementProperty::new(QName::namespaced(NS, "id"), Type::simple(StringType::string())).into(),
            ElementProperty::list(QName::namespaced(NS, "line"), Type::Complex(Arc::clone(line))).into(),
        ]),
    )
}

fn sample(line: &Arc<ComplexType>, order: &Arc<ComplexType>, lines: usize) -> Value {
    let items = (0..lines)
        .map(|i| {
            let value = line
                .construct(Arguments::new().arg(format!("SKU-{}", i)).arg(i as i64))
                .unwrap();
            Value::Compound(value)
        })
        .collect::<Vec<_>>();
    let value = order
        .construct(Arguments::new().arg("order-1").arg(items))
        .unwrap();
    Value::Compound(value)
}

fn benchmark_construct(c: &mut Criterion) {
    let line = order_line();
    line.shape().unwrap();

    c.bench_function("construct_positional", |b| {
        b.iter(|| line.construct(black_box(Arguments::new().arg("SKU").arg(3))).unwrap())
    });
}

fn benchmark_render(c: &mut Criterion) {
    let line = order_line();
    let order = order(&line);
    let value = sample(&line, &order, 100);

    c.bench_function("render_order_100_lines", |b| {
        b.iter(|| {
            let mut node = Element::new(QName::namespaced(NS, "order"));
            order.render(&mut node, black_box(&value)).unwrap();
            node
        })
    });
}

fn benchmark_parse(c: &mut Criterion) {
    let line = order_line();
    let order = order(&line);
    let value = sample(&line, &order, 100);
    let mut node = Element::new(QName::namespaced(NS, "order"));
    order.render(&mut node, &value).unwrap();
    let config = ParseConfig::default();

    c.bench_function("parse_order_100_lines", |b| {
        b.iter(|| order.parse(black_box(&node), &config).unwrap())
    });
}

criterion_group!(benches, benchmark_construct, benchmark_render, benchmark_parse);
criterion_main!(benches);
