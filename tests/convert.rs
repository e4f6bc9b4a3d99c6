//! Integration test: end-to-end conversion against an in-memory template

use std::io::{Cursor, Write};

use pretty_assertions::assert_eq;
use zip::write::{FileOptions, ZipWriter};

use hwpx_compose::package::{HEADER_PART, SECTION_PART};
use hwpx_compose::xml::XmlElement;
use hwpx_compose::{convert_json, HwpxTemplate};

const TEMPLATE_HEADER: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<hh:head xmlns:hh="http://www.hancom.co.kr/hwpml/2011/head" xmlns:hc="http://www.hancom.co.kr/hwpml/2011/core" version="1.4" secCnt="1">
  <hh:refList>
    <hh:borderFills itemCnt="1">
      <hh:borderFill id="1" threeD="0" shadow="0" centerLine="NONE" breakCellSeparateLine="0"/>
    </hh:borderFills>
    <hh:charProperties itemCnt="2">
      <hh:charPr id="0" height="1000" textColor="#000000" shadeColor="none" useFontSpace="0" useKerning="0" symMark="NONE" borderFillIDRef="1"/>
      <hh:charPr id="5" height="1000" textColor="#000000" shadeColor="none" useFontSpace="0" useKerning="0" symMark="NONE" borderFillIDRef="1"/>
    </hh:charProperties>
    <hh:paraProperties itemCnt="2">
      <hh:paraPr id="0" tabPrIDRef="0" condense="0" fontLineHeight="0" snapToGrid="1" suppressLineNumbers="0" checked="0">
        <hh:margin>
          <hc:intent value="0" unit="HWPUNIT"/>
          <hc:left value="0" unit="HWPUNIT"/>
        </hh:margin>
      </hh:paraPr>
      <hh:paraPr id="1" tabPrIDRef="0" condense="0" fontLineHeight="0" snapToGrid="1" suppressLineNumbers="0" checked="0">
        <hh:margin>
          <hc:intent value="0" unit="HWPUNIT"/>
          <hc:left value="0" unit="HWPUNIT"/>
        </hh:margin>
      </hh:paraPr>
    </hh:paraProperties>
    <hh:styles itemCnt="2">
      <hh:style id="0" type="PARA" name="바탕글" engName="Normal" paraPrIDRef="1" charPrIDRef="0" nextStyleIDRef="0" langID="1042" lockForm="0"/>
      <hh:style id="1" type="PARA" name="개요 1" engName="Outline 1" paraPrIDRef="0" charPrIDRef="0" nextStyleIDRef="1" langID="1042" lockForm="0"/>
    </hh:styles>
  </hh:refList>
</hh:head>"##;

const DOCUMENT_JSON: &str = r#"{"pandoc-api-version": [1, 23, 1], "meta": {}, "blocks": [
  {"t": "Header", "c": [1, ["intro", [], []], [{"t": "Str", "c": "Introduction"}]]},
  {"t": "Para", "c": [
    {"t": "Str", "c": "Mixed"},
    {"t": "Space"},
    {"t": "Strong", "c": [{"t": "Str", "c": "bold"}]},
    {"t": "Space"},
    {"t": "Emph", "c": [{"t": "Str", "c": "italic"}]},
    {"t": "Space"},
    {"t": "Superscript", "c": [{"t": "Str", "c": "sup"}]}
  ]},
  {"t": "OrderedList", "c": [[3, {"t": "Decimal"}, {"t": "Period"}], [
    [{"t": "Plain", "c": [{"t": "Str", "c": "third"}]}],
    [{"t": "Plain", "c": [{"t": "Str", "c": "fourth"}]}]
  ]]},
  {"t": "Table", "c": [["", [], []], [null, []],
    [[{"t": "AlignDefault"}, {"t": "ColWidthDefault"}], [{"t": "AlignDefault"}, {"t": "ColWidthDefault"}]],
    [["", [], []], []],
    [[["", [], []], 0, [], [
      [["", [], []], [
        [["", [], []], {"t": "AlignDefault"}, 1, 2, [{"t": "Plain", "c": [{"t": "Str", "c": "wide"}]}]]
      ]],
      [["", [], []], [
        [["", [], []], {"t": "AlignDefault"}, 1, 1, [{"t": "Plain", "c": [{"t": "Str", "c": "a"}]}]],
        [["", [], []], {"t": "AlignDefault"}, 1, 1, [{"t": "Plain", "c": [{"t": "Str", "c": "b"}]}]]
      ]]
    ]]],
    [["", [], []], []]
  ]}
]}"#;

fn template_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buf));
    let options: FileOptions<()> = FileOptions::default();
    for (name, data) in [
        ("mimetype", "application/hwp+zip"),
        ("Contents/content.hpf", "<opf:package/>"),
        (HEADER_PART, TEMPLATE_HEADER),
        (SECTION_PART, "<hs:sec/>"),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    buf
}

#[test]
fn test_full_document_conversion() {
    let result = convert_json(DOCUMENT_JSON, TEMPLATE_HEADER, None).unwrap();

    let section = XmlElement::parse(&result.section_xml).unwrap();
    let header = XmlElement::parse(&result.header_xml).unwrap();

    // heading mapped onto the outline style
    let heading = section
        .find_descendant(&|e| e.local_name() == "p" && e.attr("styleIDRef") == Some("1"))
        .expect("heading paragraph");
    assert!(heading.to_xml().unwrap().contains("Introduction"));

    // every synthesized character property sits above the template maximum
    let mut char_ids = Vec::new();
    header.for_each_descendant("charPr", &mut |pr| {
        char_ids.push(pr.attr_u32("id").unwrap());
    });
    let synthesized: Vec<_> = char_ids.iter().filter(|id| **id > 5).collect();
    // bold, italic and superscript each get exactly one record
    assert_eq!(synthesized.len(), 3);

    // every run references an id the header defines
    let mut dangling = Vec::new();
    section.for_each_descendant("run", &mut |run| {
        let id = run.attr_u32("charPrIDRef").unwrap();
        if !char_ids.contains(&id) {
            dangling.push(id);
        }
    });
    assert!(dangling.is_empty(), "dangling charPr refs: {:?}", dangling);

    // the ordered list keeps its start number
    let numbering = header
        .find_descendant(&|e| e.local_name() == "numbering")
        .expect("numbering definition");
    assert_eq!(numbering.attr("start"), Some("3"));

    // the spanning cell lands at column 0 and pushes nothing else into row 0
    let tbl = section
        .find_descendant(&|e| e.local_name() == "tbl")
        .expect("table");
    assert_eq!(tbl.attr("rowCnt"), Some("2"));
    assert_eq!(tbl.attr("colCnt"), Some("2"));
    let wide = tbl
        .find_descendant(&|e| e.local_name() == "cellSpan" && e.attr("colSpan") == Some("2"))
        .expect("spanning cell");
    assert_eq!(wide.attr("rowSpan"), Some("1"));
}

#[test]
fn test_conversion_is_deterministic() {
    let first = convert_json(DOCUMENT_JSON, TEMPLATE_HEADER, None).unwrap();
    let second = convert_json(DOCUMENT_JSON, TEMPLATE_HEADER, None).unwrap();

    assert_eq!(first.header_xml, second.header_xml);
    assert_eq!(first.section_xml, second.section_xml);
}

#[test]
fn test_package_round_trip() {
    let template = HwpxTemplate::from_bytes(&template_bytes()).unwrap();
    let result = convert_json(DOCUMENT_JSON, &template.header_xml().unwrap(), None).unwrap();

    let out = template
        .to_bytes(&result.header_xml, &result.section_xml)
        .unwrap();
    let document = HwpxTemplate::from_bytes(&out).unwrap();

    assert_eq!(document.header_xml().unwrap(), result.header_xml);
    assert_eq!(document.section_xml().unwrap(), result.section_xml);
    assert_eq!(document.part("mimetype").unwrap(), b"application/hwp+zip");
    assert_eq!(document.part("Contents/content.hpf").unwrap(), b"<opf:package/>");
}

#[test]
fn test_indent_correlation_end_to_end() {
    let json = r#"{"blocks": [
      {"t": "Para", "c": [{"t": "Str", "c": "indented"}, {"t": "Space"}, {"t": "Str", "c": "text"}]},
      {"t": "Para", "c": [{"t": "Str", "c": "regular"}]}
    ]}"#;
    let html = r#"<body><p style="margin-left: 40px; text-indent: -20px">indented text</p><p>regular</p></body>"#;

    let result = convert_json(json, TEMPLATE_HEADER, Some(html)).unwrap();
    let header = XmlElement::parse(&result.header_xml).unwrap();

    // one synthesized paraPr with the converted hanging indent
    let para_pr = header
        .find_descendant(&|e| e.local_name() == "paraPr" && e.attr("id") == Some("2"))
        .expect("synthesized paraPr");
    let margin = para_pr.child("margin").unwrap();
    assert_eq!(margin.child("left").unwrap().attr("value"), Some("3000"));
    assert_eq!(margin.child("intent").unwrap().attr("value"), Some("-1500"));

    let section = XmlElement::parse(&result.section_xml).unwrap();
    let mut para_refs = Vec::new();
    section.for_each_descendant("p", &mut |p| {
        if p.find_descendant(&|e| e.local_name() == "secPr").is_none() {
            para_refs.push(p.attr("paraPrIDRef").unwrap().to_string());
        }
    });
    assert_eq!(para_refs, ["2", "1"]);
}
