pub mod arena;
pub mod segtree_merge;
pub mod traversal;
