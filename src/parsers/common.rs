use anyhow::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(Self { parser })
    }

    pub fn parse_source(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("parser produced no syntax tree"))
    }

    /// Buffered file read sized to the file, as most sources are small.
    pub fn read_source(file_path: &Path) -> Result<String> {
        let file = File::open(file_path)?;
        let file_size = file.metadata()?.len() as usize;
        let mut reader =
            BufReader::with_capacity(if file_size < 8192 { file_size.max(1) } else { 8192 }, file);
        let mut content = String::with_capacity(file_size);
        reader.read_to_string(&mut content)?;
        Ok(content)
    }
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn find_child_by_kind<'a>(node: &'a TSNode, kind: &str) -> Option<TSNode<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

pub fn has_child_of_kind(node: &TSNode, kind: &str) -> bool {
    find_child_by_kind(node, kind).is_some()
}

/// Unquotes a string-literal node (`'./m'`, `"./m"`, backticks).
pub fn string_literal_value(node: &TSNode, source: &[u8]) -> String {
    extract_text(node, source)
        .trim_matches(|c| c == '\'' || c == '"' || c == '`')
        .to_string()
}
