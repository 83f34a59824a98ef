use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Children of a directory, keyed by name.
pub type Children = BTreeMap<String, Node>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// One entry of the in-memory tree.
///
/// Serializes untagged, so a fixture is written as a plain nested literal:
/// a JSON object is a directory, a JSON string is file content.
///
/// ```
/// use mock_vfs::Node;
/// use serde_json::json;
///
/// let tree: Node = serde_json::from_value(json!({
///     "filename1": "x",
///     "dir1": { "filename1": "y" }
/// }))
/// .unwrap();
/// assert!(tree.is_dir());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    File(String),
    Directory(Children),
}

impl Node {
    pub fn file<S: Into<String>>(content: S) -> Node {
        Node::File(content.into())
    }

    /// An empty directory.
    pub fn dir() -> Node {
        Node::Directory(Children::new())
    }

    /// A directory holding the given named children.
    pub fn dir_from<I, S>(children: I) -> Node
    where
        I: IntoIterator<Item = (S, Node)>,
        S: Into<String>,
    {
        Node::Directory(
            children
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            Node::File(_) => EntryType::File,
            Node::Directory(_) => EntryType::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.entry_type() == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type() == EntryType::Directory
    }

    /// File content, or `None` for a directory.
    pub fn content(&self) -> Option<&str> {
        match self {
            Node::File(content) => Some(content),
            Node::Directory(_) => None,
        }
    }

    /// Directory children, or `None` for a file.
    pub fn children(&self) -> Option<&Children> {
        match self {
            Node::Directory(children) => Some(children),
            Node::File(_) => None,
        }
    }
}

impl From<&str> for Node {
    fn from(content: &str) -> Self {
        Node::file(content)
    }
}

impl From<String> for Node {
    fn from(content: String) -> Self {
        Node::File(content)
    }
}

impl From<Children> for Node {
    fn from(children: Children) -> Self {
        Node::Directory(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_is_structural() {
        let file = Node::file("hello");
        assert!(file.is_file());
        assert!(!file.is_dir());
        assert_eq!(file.content(), Some("hello"));
        assert!(file.children().is_none());

        let dir = Node::dir();
        assert!(dir.is_dir());
        assert_eq!(dir.entry_type(), EntryType::Directory);
        assert!(dir.content().is_none());
        assert_eq!(dir.children().map(|c| c.len()), Some(0));
    }

    #[test]
    fn test_empty_file_is_still_a_file() {
        assert!(Node::file("").is_file());
    }

    #[test]
    fn test_deserialize_nested_literal() {
        let node: Node = serde_json::from_value(json!({
            "filename1": "x",
            "dir1": {
                "filename1": "y",
                "dir2": { "filename2": "z" }
            }
        }))
        .unwrap();

        let expected = Node::dir_from([
            ("filename1", Node::file("x")),
            (
                "dir1",
                Node::dir_from([
                    ("filename1", Node::file("y")),
                    ("dir2", Node::dir_from([("filename2", Node::file("z"))])),
                ]),
            ),
        ]);
        assert_eq!(node, expected);
    }

    #[test]
    fn test_deserialize_rejects_third_variant() {
        let result: Result<Node, _> = serde_json::from_value(json!({ "n": 42 }));
        assert!(result.is_err());

        let result: Result<Node, _> = serde_json::from_value(json!({ "list": ["a"] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_round_trips_literal() {
        let literal = json!({ "a": { "b": "c" }, "d": "" });
        let node: Node = serde_json::from_value(literal.clone()).unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), literal);
    }
}
