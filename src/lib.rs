//! netlimits: 3-sigma control limits for electrical measurement grids
//!
//! Reads a raw measurement grid, regroups it per NET, computes robust
//! statistics and derives LSL/USL limits that are cross-checked against
//! vendor specifications.

pub mod cli;
pub mod core;
pub mod entities;
pub mod sheet;
