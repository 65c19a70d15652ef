// Purpose: modulation-graph resolution and whole-buffer rendering
// This layer owns the operator collections and walks the routing

pub mod fm;
