//! End-to-end runs of the batch driver over scratch directories.

use image::{Rgba, RgbaImage};
use lopdf::{dictionary, Document, Object, Stream};
use pdfstamp::batch::{self, StampContext};
use pdfstamp::stamp_image::{self, Quality};
use pdfstamp::{StampError, StampLocation};
use std::fs;
use std::path::{Path, PathBuf};

fn write_pdf(path: &Path, page_count: usize, marker: &str) {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for _ in 0..page_count {
        let content = format!("% {marker}\n0 0 1 rg");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(path).unwrap();
}

fn context(dir: &Path, url: &str, locations: Vec<StampLocation>) -> StampContext {
    let logo = dir.join("logo.png");
    RgbaImage::from_pixel(50, 20, Rgba([200, 0, 0, 255]))
        .save(&logo)
        .unwrap();
    StampContext {
        image: stamp_image::load(&logo, Quality::Lossless).unwrap(),
        url: url.to_string(),
        locations,
    }
}

fn first_page_links(path: &Path) -> Vec<(Vec<f32>, Vec<u8>)> {
    let doc = Document::load(path).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    let annots = doc
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Annots")
        .unwrap()
        .as_array()
        .unwrap()
        .clone();
    annots
        .iter()
        .map(|a| {
            let annot = doc.get_dictionary(a.as_reference().unwrap()).unwrap();
            let rect = annot
                .get(b"Rect")
                .unwrap()
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_float().unwrap())
                .collect();
            let action = annot.get(b"A").unwrap().as_dict().unwrap();
            (rect, action.get(b"URI").unwrap().as_str().unwrap().to_vec())
        })
        .collect()
}

fn first_page_content(path: &Path) -> String {
    let doc = Document::load(path).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

#[test]
fn stamps_single_page_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    write_pdf(&input, 1, "doc");
    let ctx = context(
        dir.path(),
        "http://example.com",
        vec![StampLocation::new(1, 10.0, 10.0)],
    );

    let report = batch::run(&ctx, &[input.clone()], false, None);

    assert!(report.failures.is_empty());
    let output = PathBuf::from(format!("{}.out", input.display()));
    assert_eq!(report.stamped.len(), 1);
    assert_eq!(report.stamped[0].output, output);
    assert_eq!(
        first_page_links(&output),
        vec![(vec![10.0, 10.0, 60.0, 30.0], b"http://example.com".to_vec())]
    );
    let content = first_page_content(&output);
    assert!(content.contains("% doc"));
    assert!(content.contains("q 50 0 0 20 10 10 cm /PdfStamp0 Do Q"));
}

#[test]
fn omitted_url_links_to_empty_string() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    write_pdf(&input, 1, "doc");
    let ctx = context(dir.path(), "", vec![StampLocation::new(1, 0.0, 0.0)]);

    let report = batch::run(&ctx, &[input.clone()], false, None);

    assert!(report.failures.is_empty());
    assert_eq!(
        first_page_links(&report.stamped[0].output),
        vec![(vec![0.0, 0.0, 50.0, 20.0], Vec::new())]
    );
}

#[test]
fn page_out_of_range_fails_only_that_file() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = dir.path().join("in");
    fs::create_dir(&inputs).unwrap();
    let short = inputs.join("short.pdf");
    let long = inputs.join("long.pdf");
    write_pdf(&short, 1, "short");
    write_pdf(&long, 3, "long");
    let ctx = context(dir.path(), "u", vec![StampLocation::new(3, 5.0, 5.0)]);

    let report = batch::run(&ctx, &[inputs.clone()], false, None);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].input, short);
    assert!(matches!(
        report.failures[0].error,
        StampError::PageOutOfRange { page: 3, total: 1 }
    ));
    assert!(!inputs.join("short.pdf.out").exists());

    assert_eq!(report.stamped.len(), 1);
    assert_eq!(report.stamped[0].input, long);
    assert!(inputs.join("long.pdf.out").exists());
}

#[test]
fn page_zero_fails_only_that_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");
    write_pdf(&first, 1, "first");
    write_pdf(&second, 1, "second");
    let ctx = context(dir.path(), "", vec![StampLocation::new(0, 1.0, 1.0)]);

    let report = batch::run(&ctx, &[first.clone(), second.clone()], false, None);

    assert!(report.stamped.is_empty());
    let failed: Vec<_> = report.failures.iter().map(|f| f.input.clone()).collect();
    assert_eq!(failed, vec![first, second]);
    assert!(matches!(
        report.failures[0].error,
        StampError::PageOutOfRange { page: 0, total: 1 }
    ));
    assert!(!dir.path().join("first.pdf.out").exists());
}

#[test]
fn subdirectory_is_attempted_as_a_file_without_recursion() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = dir.path().join("in");
    let sub = inputs.join("nested");
    fs::create_dir_all(&sub).unwrap();
    write_pdf(&inputs.join("top.pdf"), 1, "top");
    write_pdf(&sub.join("deep.pdf"), 1, "deep");
    let ctx = context(dir.path(), "", vec![StampLocation::new(1, 0.0, 0.0)]);

    let report = batch::run(&ctx, &[inputs.clone()], false, None);

    assert_eq!(report.stamped.len(), 1);
    assert_eq!(report.stamped[0].input, inputs.join("top.pdf"));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].input, sub);
    assert!(matches!(report.failures[0].error, StampError::Load { .. }));
    assert!(!sub.join("deep.pdf.out").exists());
}

#[test]
fn recursion_reaches_nested_documents() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = dir.path().join("in");
    let sub = inputs.join("nested");
    fs::create_dir_all(&sub).unwrap();
    write_pdf(&inputs.join("top.pdf"), 1, "top");
    write_pdf(&sub.join("deep.pdf"), 1, "deep");
    let ctx = context(dir.path(), "", vec![StampLocation::new(1, 0.0, 0.0)]);

    let report = batch::run(&ctx, &[inputs.clone()], true, None);

    assert!(report.failures.is_empty());
    assert_eq!(report.stamped.len(), 2);
    assert!(inputs.join("top.pdf.out").exists());
    assert!(sub.join("deep.pdf.out").exists());
}

#[test]
fn same_basename_in_output_dir_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let out = dir.path().join("out");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    fs::create_dir_all(&out).unwrap();
    write_pdf(&a.join("doc.pdf"), 1, "from-a");
    write_pdf(&b.join("doc.pdf"), 1, "from-b");
    let ctx = context(dir.path(), "", vec![StampLocation::new(1, 0.0, 0.0)]);

    let report = batch::run(
        &ctx,
        &[a.join("doc.pdf"), b.join("doc.pdf")],
        false,
        Some(&out),
    );

    assert!(report.failures.is_empty());
    let outputs: Vec<_> = report.stamped.iter().map(|t| t.output.clone()).collect();
    assert_eq!(outputs, vec![out.join("doc.pdf.out"), out.join("doc.pdf.out")]);
    let content = first_page_content(&out.join("doc.pdf.out"));
    assert!(content.contains("% from-b"));
    assert!(!content.contains("% from-a"));
}

#[test]
fn input_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.pdf");
    write_pdf(&input, 1, "doc");
    let original = fs::read(&input).unwrap();
    let ctx = context(dir.path(), "", vec![StampLocation::new(1, 0.0, 0.0)]);

    batch::run(&ctx, &[input.clone()], false, Some(dir.path()));

    assert_eq!(fs::read(&input).unwrap(), original);
    assert!(dir.path().join("doc.pdf.out").exists());
}
