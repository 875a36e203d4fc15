//! State the external toolchain does not track for us

pub mod pointer;
