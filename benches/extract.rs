// benches/extract.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use twin_scrape::core::Document;
use twin_scrape::specs::twins;

/// Real page if one was saved locally, else a synthetic page of similar shape.
fn load_sample() -> String {
    std::fs::read_to_string(".ignore/page_samples/twins.html").unwrap_or_else(|_| synthetic_page(300, 12))
}

fn synthetic_page(hosts: usize, twins_each: usize) -> String {
    let mut body = String::new();
    for h in 0..hosts {
        body.push_str(&format!(r#"<h3>Host {h}</h3><p><a href="/wiki/Host_{h}">Host {h}</a></p><div class="div-col"><ul>"#));
        for t in 0..twins_each {
            body.push_str(&format!(
                r#"<li><span class="flagicon"></span> <a href="/wiki/Twin_{h}_{t}">Twin {h}-{t}</a>, Country {t}<sup>[{t}]</sup></li>"#
            ));
        }
        body.push_str("</ul></div>");
    }
    body.push_str("<h2>References</h2><ul><li><a href=\"/wiki/Ref\">Ref</a></li></ul>");
    format!(
        r#"<html><body><h1 id="firstHeading">List of twin towns and sister cities in Ruritania</h1><div class="mw-parser-output">{body}</div></body></html>"#
    )
}

fn bench_extract(c: &mut Criterion) {
    let html = load_sample();
    let doc = Document::parse(&html);
    let hint = twins::country_hint(&doc);

    c.bench_function("parse_document", |b| {
        b.iter(|| black_box(Document::parse(black_box(&html)).len()))
    });

    c.bench_function("extract_pairs", |b| {
        b.iter(|| black_box(twins::extract(black_box(&doc), &hint).len()))
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
