use superhtml_core::elements::ValidationMode;
use superhtml_core::html_ast;
use superhtml_core::lang::Lang;
use superhtml_core::tokenizer::Tokenizer;

fn main() {
    divan::main();
}

/// A few hundred repeated rows, enough to exercise the tag/attribute/
/// text-node paths repeatedly without shipping a large fixture file.
fn sample_document() -> Vec<u8> {
    let mut doc = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head><title>Bench</title></head>\n<body>\n<table>\n");
    for i in 0..500 {
        doc.push_str(&format!(
            "<tr id=\"row-{i}\" class=\"row even\"><td>{i}</td><td><a href=\"/item/{i}\">item {i}</a></td></tr>\n"
        ));
    }
    doc.push_str("</table>\n<script>var x = 1 < 2 && 3 > 2;</script>\n</body>\n</html>\n");
    doc.into_bytes()
}

#[divan::bench]
fn bench_tokenize_document(bencher: divan::Bencher) {
    let input = sample_document();
    bencher.bench(|| {
        let mut tokenizer = Tokenizer::new(&input, Lang::Html);
        while tokenizer.next().is_some() {}
    });
}

#[divan::bench]
fn bench_build_html_ast(bencher: divan::Bencher) {
    let input = sample_document();
    bencher.bench(|| html_ast::build(&input, Lang::Html, ValidationMode::Standard));
}
