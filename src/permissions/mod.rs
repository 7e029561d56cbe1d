#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    WildCard,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PermissionNode {
    path: Vec<PathSegment>,
    value: bool,
}

impl PermissionNode {
    fn parse(name: &str) -> PermissionNode {
        let (name, value) = match name.strip_prefix('-') {
            Some(negated) => (negated, false),
            None => (name, true),
        };
        let path = name
            .split('.')
            .map(|s| match s {
                "*" => PathSegment::WildCard,
                s => PathSegment::Named(s.to_lowercase()),
            })
            .collect();
        PermissionNode { path, value }
    }

    fn matches(&self, name: &str) -> bool {
        let mut segments = name.split('.');
        for node_segment in &self.path {
            match (node_segment, segments.next()) {
                (PathSegment::WildCard, _) => return true,
                (PathSegment::Named(expected), Some(segment)) => {
                    if !expected.eq_ignore_ascii_case(segment) {
                        return false;
                    }
                }
                (PathSegment::Named(_), None) => return false,
            }
        }
        segments.next().is_none()
    }
}

/// Permission nodes such as `cmdtree.world.*` or `-cmdtree.stop`, checked in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    nodes: Vec<PermissionNode>,
}

impl PermissionSet {
    pub fn new<I, S>(nodes: I) -> PermissionSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PermissionSet {
            nodes: nodes
                .into_iter()
                .map(|node| PermissionNode::parse(node.as_ref().trim()))
                .collect(),
        }
    }

    /// The value of the first node matching `name`.
    pub fn get_node_val(&self, name: &str) -> Option<bool> {
        self.nodes
            .iter()
            .find(|node| node.matches(name))
            .map(|node| node.value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get_node_val(name).unwrap_or(false)
    }
}
