// Copyright 2026 Cornell University
// released under MIT License
// author: Nikil Shyamunder <nvs26@cornell.edu>
// author: Kevin Laeufer <laeufer@cornell.edu>
// author: Francis Pham <fdp25@cornell.edu>

pub mod backends;
pub mod diagnostic;
pub mod errors;
pub mod ir;
pub mod serialize;
pub mod validate;
