//! # Region quadtree (2D)
//!
//! A rebuildable spatial index over the simulation domain, used purely as a
//! range-query accelerator: "which particles lie inside this rectangle".
//! It stores no aggregate mass data and is never used to approximate forces.
//!
//! ## Layout
//!
//! - All nodes live in one arena (`QuadTree::nodes`); children are indices
//!   into it, and the root is index 0.
//! - Particles are referenced by handle, their index in `ParticleSet`.
//!   Positions are read from the particle slice passed to `insert`/`query`,
//!   so the tree is only meaningful for the snapshot it was built from.
//! - A node is either a leaf holding up to `capacity` handles, or an internal
//!   node with exactly 4 children and no handles of its own.
//! - Leaves at `max_depth` (capped at [`MAX_TREE_DEPTH`]) or narrower than
//!   `MIN_CELL_SIZE` never subdivide and may exceed `capacity`, which bounds
//!   recursion when many particles share one position.
//!
//! ## Boundary convention
//!
//! [`Rect::contains`] and [`Rect::intersects`] are both half-open:
//! a rect covers `[x, x + w) × [y, y + h)`. During subdivision a point goes
//! to the child selected by comparing against the node midpoint (`>= mid`
//! goes right/up), so every handle lands in exactly one child.
//! [`Rect::domain`] pads its far edges so that a closed domain
//! `[-h, h]²` fits inside the half-open root.

use crate::simulation::states::{NVec3, Particle};

/// Relative padding applied to the far edges of [`Rect::domain`]
const DOMAIN_PAD: f64 = 1.0e-9;

/// Deepest level any tree may reach, whatever `max_depth` asks for.
/// f64 cells stop shrinking meaningfully long before this.
pub const MAX_TREE_DEPTH: usize = 64;

/// Cells this small never split
const MIN_CELL_SIZE: f64 = 1.0e-12;

/// Axis-aligned rectangle anchored at its minimum corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Square of half-width `half` centered on `(cx, cy)`
    pub fn centered(cx: f64, cy: f64, half: f64) -> Self {
        Self::new(cx - half, cy - half, 2.0 * half, 2.0 * half)
    }

    /// Rect covering the closed domain `[-half_extent, half_extent]²`
    pub fn domain(half_extent: f64) -> Self {
        let side = 2.0 * half_extent * (1.0 + DOMAIN_PAD);
        Self::new(-half_extent, -half_extent, side, side)
    }

    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    pub fn contains(&self, p: &NVec3) -> bool {
        self.contains_point(p.x, p.y)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// Closed-edge overlap test used to prune query descent. Looser than
    /// `intersects`, so rounding in child bounds never hides a point.
    fn may_overlap(&self, other: &Rect) -> bool {
        self.x <= other.x + other.w
            && other.x <= self.x + self.w
            && self.y <= other.y + other.h
            && other.y <= self.y + self.h
    }

    fn midpoint(&self) -> (f64, f64) {
        (self.x + 0.5 * self.w, self.y + 0.5 * self.h)
    }

    /// Quadrant `idx` (bit 0: right half, bit 1: upper half)
    fn quadrant(&self, idx: usize) -> Rect {
        let (mx, my) = self.midpoint();
        let (x0, x1) = if idx & 1 == 0 { (self.x, mx) } else { (mx, self.x + self.w) };
        let (y0, y1) = if idx & 2 == 0 { (self.y, my) } else { (my, self.y + self.h) };
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    fn quadrant_for(&self, p: &NVec3) -> usize {
        let (mx, my) = self.midpoint();
        let mut idx = 0;
        if p.x >= mx { idx |= 1; } // bit 0
        if p.y >= my { idx |= 2; } // bit 1
        idx
    }
}

/// One quadtree node
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub bounds: Rect,
    pub depth: usize,
    pub held: Vec<usize>, // particle handles, empty for internal nodes
    pub children: Option<[usize; 4]>, // indices into QuadTree::nodes
}

impl QuadNode {
    fn leaf(bounds: Rect, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            held: Vec::new(),
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    pub nodes: Vec<QuadNode>,
    capacity: usize,
    max_depth: usize,
}

impl QuadTree {
    const ROOT: usize = 0;

    /// Empty tree: a single leaf covering `bounds`.
    /// `capacity` is raised to 1 if given as 0, `max_depth` is clamped
    /// to `1..=MAX_TREE_DEPTH`.
    pub fn new(bounds: Rect, capacity: usize, max_depth: usize) -> Self {
        Self {
            nodes: vec![QuadNode::leaf(bounds, 0)],
            capacity: capacity.max(1),
            max_depth: max_depth.clamp(1, MAX_TREE_DEPTH),
        }
    }

    /// Build a tree over `bounds` holding every particle.
    /// Returns the tree and the number of particles that fell outside it.
    pub fn build(particles: &[Particle], bounds: Rect, capacity: usize, max_depth: usize) -> (Self, usize) {
        let mut tree = Self::new(bounds, capacity, max_depth);
        let dropped = (0..particles.len())
            .filter(|&i| !tree.insert(i, particles))
            .count();
        (tree, dropped)
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[Self::ROOT].bounds
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Deepest level reached so far
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Insert handle `i`, reading its position from `particles[i]`.
    /// Returns `false` (and changes nothing) if the position lies outside
    /// the root bounds or is not finite.
    pub fn insert(&mut self, i: usize, particles: &[Particle]) -> bool {
        let pos = particles[i].x;
        if !self.nodes[Self::ROOT].bounds.contains(&pos) {
            return false;
        }
        let mut node_idx = Self::ROOT;
        // Walk down to the leaf owning this position
        while let Some(children) = self.nodes[node_idx].children {
            node_idx = children[self.nodes[node_idx].bounds.quadrant_for(&pos)];
        }
        self.insert_into_leaf(node_idx, i, particles);
        true
    }

    /// Place handle `i` in leaf `node_idx`, splitting the leaf when it is full
    fn insert_into_leaf(&mut self, node_idx: usize, i: usize, particles: &[Particle]) {
        let node = &self.nodes[node_idx];
        let too_small = node.bounds.w <= MIN_CELL_SIZE || node.bounds.h <= MIN_CELL_SIZE;
        if node.held.len() < self.capacity || node.depth >= self.max_depth || too_small {
            self.nodes[node_idx].held.push(i);
            return;
        }

        let children = self.subdivide(node_idx);

        // Redistribute the previous occupants plus the newcomer
        let mut pending = std::mem::take(&mut self.nodes[node_idx].held);
        pending.push(i);
        let bounds = self.nodes[node_idx].bounds;
        for handle in pending {
            let child = children[bounds.quadrant_for(&particles[handle].x)];
            self.insert_into_leaf(child, handle, particles);
        }
    }

    /// Create the 4 children of a leaf and turn it into an internal node
    fn subdivide(&mut self, node_idx: usize) -> [usize; 4] {
        let bounds = self.nodes[node_idx].bounds;
        let depth = self.nodes[node_idx].depth + 1;
        let first = self.nodes.len();
        for q in 0..4 {
            self.nodes.push(QuadNode::leaf(bounds.quadrant(q), depth));
        }
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[node_idx].children = Some(children);
        children
    }

    /// Handles whose positions lie inside `range`
    pub fn query(&self, range: &Rect, particles: &[Particle]) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_into(range, particles, &mut out);
        out
    }

    /// Like [`QuadTree::query`] but appends into a caller-owned buffer
    pub fn query_into(&self, range: &Rect, particles: &[Particle], out: &mut Vec<usize>) {
        self.query_node(Self::ROOT, range, particles, out);
    }

    fn query_node(&self, node_idx: usize, range: &Rect, particles: &[Particle], out: &mut Vec<usize>) {
        let node = &self.nodes[node_idx];

        // Fast rejection
        if !node.bounds.may_overlap(range) {
            return;
        }

        match node.children {
            None => out.extend(
                node.held
                    .iter()
                    .copied()
                    .filter(|&h| range.contains(&particles[h].x)),
            ),
            Some(children) => {
                for child in children {
                    self.query_node(child, range, particles, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::Role;

    fn at(x: f64, y: f64) -> Particle {
        Particle::new(NVec3::new(x, y, 0.0), NVec3::zeros(), 1.0, Role::Normal)
    }

    /// Every node is either a leaf or an internal node with no handles
    fn assert_node_invariants(tree: &QuadTree) {
        for n in &tree.nodes {
            if n.is_leaf() {
                assert!(n.held.len() <= tree.capacity() || n.depth >= tree.max_depth);
            } else {
                assert!(n.held.is_empty(), "internal node holds handles");
            }
        }
    }

    #[test]
    fn half_open_containment() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(r.contains_point(0.0, 0.0));
        assert!(r.contains_point(0.5, 0.999));
        assert!(!r.contains_point(1.0, 0.5));
        assert!(!r.contains_point(0.5, 1.0));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(!a.intersects(&Rect::new(1.0, 0.0, 1.0, 1.0)));
        assert!(a.intersects(&Rect::new(0.999, 0.0, 1.0, 1.0)));
        assert!(a.intersects(&Rect::new(0.25, 0.25, 0.1, 0.1)));
    }

    #[test]
    fn domain_includes_far_edges() {
        let d = Rect::domain(1.0);
        assert!(d.contains_point(1.0, 1.0));
        assert!(d.contains_point(-1.0, -1.0));
        assert!(!d.contains_point(1.01, 0.0));
    }

    #[test]
    fn quadrants_tile_parent() {
        let r = Rect::new(-1.0, -1.0, 2.0, 2.0);
        let area: f64 = (0..4).map(|q| r.quadrant(q)).map(|c| c.w * c.h).sum();
        assert!((area - 4.0).abs() < 1e-12);
        assert_eq!(r.quadrant(0), Rect::new(-1.0, -1.0, 1.0, 1.0));
        assert_eq!(r.quadrant(3), Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn split_keeps_all_occupants() {
        let particles: Vec<Particle> = vec![at(-0.5, -0.5), at(0.5, -0.5), at(-0.5, 0.5), at(0.5, 0.5), at(0.1, 0.1)];
        let (tree, dropped) = QuadTree::build(&particles, Rect::domain(1.0), 4, 8);
        assert_eq!(dropped, 0);
        assert!(!tree.nodes[0].is_leaf(), "root should have split on the 5th insert");
        assert_node_invariants(&tree);

        let mut found = tree.query(&Rect::domain(1.0), &particles);
        found.sort_unstable();
        assert_eq!(found, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn coincident_particles_stop_at_max_depth() {
        let particles: Vec<Particle> = (0..50).map(|_| at(0.3, 0.3)).collect();
        let (tree, dropped) = QuadTree::build(&particles, Rect::domain(1.0), 1, 6);
        assert_eq!(dropped, 0);
        assert_eq!(tree.depth(), 6);
        assert_node_invariants(&tree);
        assert_eq!(tree.query(&Rect::domain(1.0), &particles).len(), 50);
    }

    #[test]
    fn requested_depth_is_capped() {
        let particles: Vec<Particle> = (0..3).map(|_| at(0.3, 0.3)).collect();
        let (tree, dropped) = QuadTree::build(&particles, Rect::domain(1.0), 1, 200_000);
        assert_eq!(dropped, 0);
        assert!(tree.depth() <= MAX_TREE_DEPTH, "depth {}", tree.depth());
        assert!(tree.nodes.len() <= 4 * MAX_TREE_DEPTH + 1);
        assert_eq!(tree.query(&Rect::domain(1.0), &particles).len(), 3);
    }

    #[test]
    fn tiny_cells_do_not_split() {
        let particles: Vec<Particle> = (0..3).map(|_| at(0.0, 0.0)).collect();
        let (tree, _) = QuadTree::build(&particles, Rect::new(0.0, 0.0, 1.0e-13, 1.0e-13), 1, 16);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].held.len(), 3);
    }

    #[test]
    fn out_of_bounds_insert_is_dropped() {
        let particles = vec![at(0.0, 0.0), at(3.0, 0.0), at(f64::NAN, 0.0)];
        let (tree, dropped) = QuadTree::build(&particles, Rect::domain(1.0), 4, 8);
        assert_eq!(dropped, 2);
        assert_eq!(tree.query(&Rect::domain(5.0), &particles), vec![0]);
    }

    #[test]
    fn disjoint_range_returns_nothing() {
        let particles = vec![at(0.2, 0.2), at(-0.2, 0.2)];
        let (tree, _) = QuadTree::build(&particles, Rect::domain(1.0), 1, 8);
        assert!(tree.query(&Rect::new(5.0, 5.0, 1.0, 1.0), &particles).is_empty());
        assert_eq!(tree.query(&Rect::centered(0.2, 0.2, 0.05), &particles), vec![0]);
    }
}
