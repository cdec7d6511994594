use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

use docchat_core::config::Config;
use docchat_core::docx::DocxReader;
use docchat_core::loader::DirectoryLoader;
use docchat_core::node_parser::SentenceSplitter;
use docchat_core::nodes::{annotate_nodes, filter_nodes, group_nodes};
use docchat_core::traits::{DocumentReader, NodeParser};
use docchat_core::types::{Node, MetadataMode};

fn write_docx(path: &Path, paragraphs: &[&str], subject: Option<&str>) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    zip.start_file("word/document.xml", options).unwrap();
    write!(zip, "<w:document><w:body>{}</w:body></w:document>", body).unwrap();
    if let Some(subject) = subject {
        zip.start_file("docProps/core.xml", options).unwrap();
        write!(zip, "<cp:coreProperties><dc:subject>{}</dc:subject></cp:coreProperties>", subject).unwrap();
    }
    zip.finish().unwrap();
}

fn node_with(position: i64, topic: Option<&str>) -> Node {
    let mut n = Node::new(format!("doc:{}", position), format!("text {}", position));
    n.metadata.insert("position".into(), serde_json::json!(position));
    if let Some(t) = topic { n.metadata.insert("topic".into(), serde_json::json!(t)); }
    n
}

#[test]
fn docx_reader_extracts_text_and_topic() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("wells.docx");
    write_docx(&path, &["Dig below the frost line.", "Line it with stone."], Some("Water"));

    let docs = DocxReader::new().load_data(&path).expect("parse docx");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "wells.docx");
    assert_eq!(docs[0].text, "Dig below the frost line.\n\nLine it with stone.");
    assert_eq!(docs[0].metadata["topic"], "Water");
    assert_eq!(docs[0].metadata["file_name"], "wells.docx");
}

#[test]
fn loader_skips_bad_and_foreign_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    write_docx(&dir.join("good.docx"), &["Short text"], None);
    fs::write(dir.join("legacy.doc"), b"\xD0\xCF\x11\xE0 not a zip").unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let loader = DirectoryLoader::new(dir, DocxReader::new());
    let docs = loader.load().expect("load");

    assert_eq!(docs.len(), 1, "only the valid docx is loaded");
    assert_eq!(docs[0].text, "Short text");
}

#[test]
fn loader_empty_directory_is_ok() {
    let tmp = TempDir::new().unwrap();
    let docs = DirectoryLoader::new(tmp.path(), DocxReader::new()).load().expect("load");
    assert!(docs.is_empty());
}

#[test]
fn loader_missing_directory_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope");
    assert!(DirectoryLoader::new(missing, DocxReader::new()).load().is_err());
}

#[test]
fn annotate_assigns_sequential_positions_and_synthetic_paths() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.docx");
    write_docx(&path, &["One.", "Two."], None);
    let docs = DocxReader::new().load_data(&path).unwrap();
    let mut nodes = SentenceSplitter::default().get_nodes_from_documents(&docs);
    nodes.push(Node::new("extra:0", "extra"));
    nodes.push(Node::new("extra:1", "more"));
    annotate_nodes(&mut nodes);

    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(node.position(), Some(i as i64));
        assert_eq!(node.metadata["file_name"], format!("file_{}.txt", i).as_str());
        assert_eq!(node.metadata["file_path"], format!("/path/to/file_{}.txt", i).as_str());
        assert_eq!(node.excluded_llm_metadata_keys, vec!["file_path".to_string()]);
        assert!(!node.get_content(MetadataMode::Llm).contains("/path/to/"));
    }
}

#[test]
fn filter_keeps_prefix_in_order_and_is_idempotent() {
    let nodes: Vec<Node> = [3, 0, 2, 1, 4].iter().map(|&p| node_with(p, None)).collect();
    for cutoff in -1..=5 {
        let filtered = filter_nodes(&nodes, cutoff);
        let expected: Vec<i64> = [3, 0, 2, 1, 4].into_iter().filter(|&p| p <= cutoff).collect();
        let got: Vec<i64> = filtered.iter().filter_map(Node::position).collect();
        assert_eq!(got, expected, "cutoff {}", cutoff);
        assert_eq!(filter_nodes(&filtered, cutoff), filtered);
    }
    assert!(filter_nodes(&Vec::<Node>::new(), 10).is_empty());
    assert!(filter_nodes(&[Node::new("x", "no position")], 10).is_empty());
}

#[test]
fn group_partitions_without_loss() {
    let nodes = vec![
        node_with(0, Some("B")),
        node_with(1, None),
        node_with(2, Some("A")),
        node_with(3, Some("B")),
    ];
    let groups = group_nodes(&nodes);
    assert_eq!(groups.len(), 3);
    assert_eq!(groups.topics().collect::<Vec<_>>(), vec!["B", "Unknown", "A"]);
    let b: Vec<i64> = groups.get("B").unwrap().iter().filter_map(Node::position).collect();
    assert_eq!(b, vec![0, 3]);
    let total: usize = groups.iter().map(|(_, members)| members.len()).sum();
    assert_eq!(total, nodes.len());
    assert!(group_nodes(&Vec::<Node>::new()).is_empty());
}

#[test]
fn config_layers_file_and_env() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("docchat.toml", "[data]\ndocs_dir = \"~/docs\"\n[retrieval]\nanswer_top_k = 4\n")?;
        jail.create_file("docchat.test.toml", "[chunking]\nchunk_size = 512\nchunk_overlap = 64\n")?;
        jail.set_env("DOCCHAT_SYNTHESIS__MAX_CHARS", "99");

        let config = Config::load_for_env("test").map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.data.docs_dir, "~/docs");
        assert_eq!(settings.retrieval.answer_top_k, 4);
        assert_eq!(settings.retrieval.locate_top_k, 1);
        assert_eq!(settings.chunking.chunk_size, 512);
        assert_eq!(settings.synthesis.max_chars, 99);
        let overlap: usize = config.get("chunking.chunk_overlap").map_err(|e| e.to_string())?;
        assert_eq!(overlap, 64);
        Ok(())
    });
}

#[test]
fn config_rejects_invalid_chunking() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("docchat.toml", "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n")?;
        assert!(Config::load_for_env("dev").is_err());
        Ok(())
    });
}
