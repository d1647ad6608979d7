//! A minimal to-do list that reminds you before things are due.
//!
//! Tasks live in memory for the duration of a session. Confirming the list
//! arms two notices for its first task: a reminder shortly before its time
//! and a second one when it is due.

#[macro_use]
extern crate prettytable;

pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod interface;
pub mod model;
pub mod notify;
pub mod reminder;
