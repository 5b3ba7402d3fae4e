//! Core data models for dungeon assessment
//!
//! The unified dungeon document produced by the format adapters, plus the
//! report record handed back to callers. Rooms and corridors are the graph's
//! nodes; connections are undirected edges between node ids.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Errors raised while loading or validating a dungeon document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to parse dungeon document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Level '{level}' declares node id '{id}' more than once")]
    DuplicateNode { level: String, id: String },

    #[error("Level '{level}' has a connection to unknown node '{id}'")]
    DanglingConnection { level: String, id: String },
}

/// A 2D position in map units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Width/height of a rectangle in map units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned bounding rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Rectangle from a top-left corner and a size (negative sizes are flipped)
    pub fn from_rect(position: Point, size: Size) -> Self {
        let (x0, x1) = ordered(position.x, position.x + size.width);
        let (y0, y1) = ordered(position.y, position.y + size.height);
        Self {
            min_x: x0,
            min_y: y0,
            max_x: x1,
            max_y: y1,
        }
    }

    /// Smallest rectangle containing all points, or `None` for an empty slice
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn diagonal(&self) -> f64 {
        (self.width().powi(2) + self.height().powi(2)).sqrt()
    }

    /// Zero width or zero height
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Grow the rectangle by `by` on every side
    pub fn inflate(&self, by: f64) -> Bounds {
        Bounds {
            min_x: self.min_x - by,
            min_y: self.min_y - by,
            max_x: self.max_x + by,
            max_y: self.max_y + by,
        }
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Length of the shared span on the x axis (negative = gap)
    pub fn overlap_x(&self, other: &Bounds) -> f64 {
        self.max_x.min(other.max_x) - self.min_x.max(other.min_x)
    }

    /// Length of the shared span on the y axis (negative = gap)
    pub fn overlap_y(&self, other: &Bounds) -> f64 {
        self.max_y.min(other.max_y) - self.min_y.max(other.min_y)
    }

    /// Edge-to-edge distance; 0 when the rectangles touch or overlap
    pub fn gap(&self, other: &Bounds) -> f64 {
        let dx = (-self.overlap_x(other)).max(0.0);
        let dy = (-self.overlap_y(other)).max(0.0);
        dx.hypot(dy)
    }

    pub fn intersection_area(&self, other: &Bounds) -> f64 {
        self.overlap_x(other).max(0.0) * self.overlap_y(other).max(0.0)
    }

    pub fn contains(&self, p: Point, tolerance: f64) -> bool {
        p.x >= self.min_x - tolerance
            && p.x <= self.max_x + tolerance
            && p.y >= self.min_y - tolerance
            && p.y <= self.max_y + tolerance
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Grid description from the document header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// "square" or "hex"
    #[serde(default = "default_grid_kind", rename = "type")]
    pub kind: String,
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            kind: default_grid_kind(),
            cell_size: default_cell_size(),
        }
    }
}

fn default_grid_kind() -> String {
    "square".to_string()
}

fn default_cell_size() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub grid: GridSpec,
}

/// A room node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_entrance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_exit: Option<bool>,
}

impl Room {
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            position: Point::new(x, y),
            size: Size::new(width, height),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn as_entrance(mut self) -> Self {
        self.is_entrance = Some(true);
        self
    }

    pub fn as_exit(mut self) -> Self {
        self.is_exit = Some(true);
        self
    }
}

/// A corridor node, optionally described by a centre-line path
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Corridor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_entrance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_exit: Option<bool>,
}

impl Corridor {
    /// Default corridor width when a path is given without one
    pub const DEFAULT_WIDTH: f64 = 1.0;

    pub fn along(id: impl Into<String>, path: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            path,
            ..Default::default()
        }
    }

    pub fn bounds(&self) -> Bounds {
        match Bounds::enclosing(&self.path) {
            Some(extent) => extent.inflate(self.width.unwrap_or(Self::DEFAULT_WIDTH) / 2.0),
            None => Bounds::from_rect(self.position, self.size),
        }
    }
}

/// An undirected edge between two node ids
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Connection {
    pub from_room: String,
    pub to_room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inferred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Connection {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            from_room: a.into(),
            to_room: b.into(),
            ..Default::default()
        }
    }

    /// True when this edge joins `a` and `b`, in either direction
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.from_room == a && self.to_room == b) || (self.from_room == b && self.to_room == a)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from_room == id || self.to_room == id
    }
}

/// Door evidence; not a graph edge by itself
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Door {
    pub id: String,
    #[serde(default)]
    pub position: Point,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connects: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inferred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Treasure,
    Monster,
    Boss,
    Special,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameElement {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ElementKind,
    #[serde(default)]
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GameElement {
    pub fn new(id: impl Into<String>, kind: ElementKind, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            position: Point::new(x, y),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Room,
    Corridor,
}

/// Borrowed view over a graph node (room or corridor)
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Room(&'a Room),
    Corridor(&'a Corridor),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            NodeRef::Room(r) => &r.id,
            NodeRef::Corridor(c) => &c.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Room(_) => NodeKind::Room,
            NodeRef::Corridor(_) => NodeKind::Corridor,
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            NodeRef::Room(r) => Bounds::from_rect(r.position, r.size),
            NodeRef::Corridor(c) => c.bounds(),
        }
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn is_entrance(&self) -> bool {
        match self {
            NodeRef::Room(r) => r.is_entrance == Some(true),
            NodeRef::Corridor(c) => c.is_entrance == Some(true),
        }
    }

    pub fn is_exit(&self) -> bool {
        match self {
            NodeRef::Room(r) => r.is_exit == Some(true),
            NodeRef::Corridor(c) => c.is_exit == Some(true),
        }
    }

    /// Name and description joined, for keyword heuristics
    pub fn text(&self) -> String {
        let (name, description) = match self {
            NodeRef::Room(r) => (&r.name, &r.description),
            NodeRef::Corridor(c) => (&c.name, &c.description),
        };
        [name.as_deref(), description.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One level of a dungeon
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_size: Option<Size>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub corridors: Vec<Corridor>,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub game_elements: Vec<GameElement>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub connections_inferred: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub doors_inferred: bool,
}

impl Level {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Default::default()
        }
    }

    /// Rooms first, then corridors, each in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.rooms
            .iter()
            .map(NodeRef::Room)
            .chain(self.corridors.iter().map(NodeRef::Corridor))
    }

    pub fn node(&self, id: &str) -> Option<NodeRef<'_>> {
        self.nodes().find(|n| n.id() == id)
    }

    pub fn node_count(&self) -> usize {
        self.rooms.len() + self.corridors.len()
    }

    pub fn is_connected(&self, a: &str, b: &str) -> bool {
        self.connections.iter().any(|c| c.joins(a, b))
    }

    /// Extent used for spatial rubrics: declared map size, else the node bounding box
    pub fn map_extent(&self) -> Bounds {
        if let Some(size) = self.map_size {
            if size.width > 0.0 && size.height > 0.0 {
                return Bounds::from_rect(Point::default(), size);
            }
        }
        self.nodes()
            .map(|n| n.bounds())
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default()
    }

    pub fn elements_of<'a>(
        &'a self,
        kinds: &'a [ElementKind],
    ) -> impl Iterator<Item = &'a GameElement> + 'a {
        self.game_elements
            .iter()
            .filter(move |e| kinds.contains(&e.kind))
    }

    /// Check node id uniqueness and connection endpoints
    pub fn validate(&self) -> Vec<DocumentError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        for node in self.nodes() {
            if !seen.insert(node.id()) {
                errors.push(DocumentError::DuplicateNode {
                    level: self.id.clone(),
                    id: node.id().to_string(),
                });
            }
        }
        for conn in &self.connections {
            for end in [&conn.from_room, &conn.to_room] {
                if !seen.contains(end.as_str()) {
                    errors.push(DocumentError::DanglingConnection {
                        level: self.id.clone(),
                        id: end.clone(),
                    });
                }
            }
        }
        errors
    }
}

/// The unified dungeon document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dungeon {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl Dungeon {
    pub fn from_json(content: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Single-level document, mostly for tests and small tools
    pub fn single_level(level: Level) -> Self {
        Self {
            header: Header::default(),
            levels: vec![level],
        }
    }

    pub fn validate(&self) -> Vec<DocumentError> {
        self.levels.iter().flat_map(|l| l.validate()).collect()
    }
}

/// Letter grade for an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Scores within this distance below a boundary still earn the higher band
    const BOUNDARY_EPSILON: f64 = 1e-9;

    /// Fixed bands: >=0.8 A, >=0.6 B, >=0.4 C, >=0.3 D, else F
    pub fn from_score(score: f64) -> Self {
        let s = score + Self::BOUNDARY_EPSILON;
        match s {
            s if s >= 0.8 => Grade::A,
            s if s >= 0.6 => Grade::B,
            s if s >= 0.4 => Grade::C,
            s if s >= 0.3 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", letter)
    }
}

/// Assessment result handed to API/CLI callers. The field set is persisted
/// verbatim by callers and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub scores: BTreeMap<String, f64>,
    pub details: BTreeMap<String, serde_json::Value>,
    pub overall_score: f64,
    pub grade: Grade,
    pub recommendations: Vec<String>,
    pub spatial_inference_used: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(1.0), Grade::A);
        assert_eq!(Grade::from_score(0.80), Grade::A);
        assert_eq!(Grade::from_score(0.79), Grade::B);
        assert_eq!(Grade::from_score(0.60), Grade::B);
        assert_eq!(Grade::from_score(0.59), Grade::C);
        assert_eq!(Grade::from_score(0.40), Grade::C);
        assert_eq!(Grade::from_score(0.39), Grade::D);
        assert_eq!(Grade::from_score(0.30), Grade::D);
        assert_eq!(Grade::from_score(0.29), Grade::F);
        assert_eq!(Grade::from_score(0.0), Grade::F);
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Grade::C).unwrap(), "\"C\"");
        assert_eq!(Grade::D.to_string(), "D");
    }

    #[test]
    fn test_bounds_gap() {
        let a = Bounds::from_rect(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let touching = Bounds::from_rect(Point::new(10.0, 0.0), Size::new(5.0, 5.0));
        let diagonal = Bounds::from_rect(Point::new(13.0, 14.0), Size::new(5.0, 5.0));
        assert_eq!(a.gap(&touching), 0.0);
        assert!((a.gap(&diagonal) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_corridor_bounds_from_path() {
        let corridor = Corridor::along("c1", vec![Point::new(2.0, 5.0), Point::new(8.0, 5.0)]);
        let b = corridor.bounds();
        assert_eq!(b.min_x, 1.5);
        assert_eq!(b.max_x, 8.5);
        assert_eq!(b.min_y, 4.5);
        assert_eq!(b.max_y, 5.5);
    }

    #[test]
    fn test_parse_minimal_document() {
        let json = r#"{
            "header": {"name": "Crypt", "grid": {"type": "square", "cell_size": 5}},
            "levels": [{
                "id": "L1",
                "rooms": [{"id": "a", "position": {"x": 0, "y": 0}, "size": {"width": 4, "height": 4}}],
                "game_elements": [{"id": "g1", "type": "dragon", "position": {"x": 1, "y": 1}}]
            }]
        }"#;
        let dungeon = Dungeon::from_json(json).unwrap();
        assert_eq!(dungeon.header.name, "Crypt");
        assert_eq!(dungeon.header.grid.cell_size, 5.0);
        assert_eq!(dungeon.levels[0].rooms.len(), 1);
        assert_eq!(dungeon.levels[0].game_elements[0].kind, ElementKind::Other);
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(matches!(
            Dungeon::from_json("{\"levels\": 3}"),
            Err(DocumentError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_reports_duplicates_and_dangling() {
        let mut level = Level::new("L1");
        level.rooms.push(Room::new("a", 0.0, 0.0, 2.0, 2.0));
        level.rooms.push(Room::new("a", 5.0, 0.0, 2.0, 2.0));
        level.connections.push(Connection::new("a", "ghost"));
        let errors = level.validate();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], DocumentError::DuplicateNode { .. }));
        assert!(matches!(errors[1], DocumentError::DanglingConnection { .. }));
    }

    #[test]
    fn test_connection_is_unordered() {
        let c = Connection::new("a", "b");
        assert!(c.joins("a", "b"));
        assert!(c.joins("b", "a"));
        assert!(!c.joins("a", "c"));
    }

    #[test]
    fn test_map_extent_falls_back_to_nodes() {
        let mut level = Level::new("L1");
        level.rooms.push(Room::new("a", 0.0, 0.0, 2.0, 2.0));
        level.rooms.push(Room::new("b", 10.0, 4.0, 2.0, 2.0));
        let extent = level.map_extent();
        assert_eq!(extent.max_x, 12.0);
        assert_eq!(extent.max_y, 6.0);

        level.map_size = Some(Size::new(40.0, 30.0));
        assert_eq!(level.map_extent().max_x, 40.0);
    }
}
