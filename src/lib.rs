// ==============================================================================
// lib.rs - Genetics QC Library
// ==============================================================================
// Description: Library interface for sequencing QC metrics parsing and
//              QC decision modules
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod region;
pub mod models;
pub mod parsers;
pub mod collections;
pub mod config;
pub mod sample;
pub mod qc;
pub mod output;
pub mod processor;
