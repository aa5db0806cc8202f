mod common;
mod evaluation;
mod service;
