extern crate rmpeck;

use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId};
use rmpeck::{
    schemes::mpeck::Mpeck,
    utils::slots::KeywordIndex
};

fn index_with(slots: usize) -> KeywordIndex {
    let index = KeywordIndex::new();
    for i in 1..slots {
        index.add(&format!("kw{}", i)).unwrap();
    }
    index
}

fn criterion_mpeck_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("setup");
    group.bench_function("MPECK", |b| b.iter(Mpeck::setup));
    group.bench_function("keygen", |b| {
        let scheme = Mpeck::setup();
        b.iter(|| scheme.keygen())
    });
    group.finish();
}

fn criterion_mpeck_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let scheme = Mpeck::setup();
    let key = scheme.keygen();
    for slots in [4_usize, 16, 64] {
        let index = index_with(slots);
        let sequence = index.expand(&["kw1"]).unwrap();
        group.bench_with_input(BenchmarkId::new("MPECK", slots), &slots, |b, &_slots| {
            b.iter(|| scheme.encode(&index, &[key.pk.clone()], &sequence, b"our plaintext!").unwrap())
        });
    }
    group.finish();
}

fn criterion_mpeck_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let scheme = Mpeck::setup();
    let key = scheme.keygen();
    let index = index_with(16);
    let keywords: Vec<String> = (1..9).map(|i| format!("kw{}", i)).collect();
    let (_ct, doc) = scheme
        .encode(&index, &[key.pk.clone()], &index.expand(&keywords).unwrap(), b"our plaintext!")
        .unwrap();
    for terms in [1_usize, 4, 8] {
        let query = index.query(&keywords[..terms]).unwrap();
        group.bench_with_input(BenchmarkId::new("trapdoor", terms), &terms, |b, &_terms| {
            b.iter(|| scheme.trapdoor(&key.sk, &query).unwrap())
        });
        let trapdoor = scheme.trapdoor(&key.sk, &query).unwrap();
        group.bench_with_input(BenchmarkId::new("test", terms), &terms, |b, &_terms| {
            b.iter(|| scheme.test(key.pk.index, &doc, &trapdoor))
        });
    }
    group.finish();
}

criterion_group!(benches,
    criterion_mpeck_setup,
    criterion_mpeck_encode,
    criterion_mpeck_search,
);

criterion_main!(benches);
