//! Header of the recovery entry point script.
//!
//! The control script that follows reads the variables in exactly this order.

pub const UPDATE_BINARY_HEADER: &str = r"#! /sbin/sh
EX_ARM='{{ex_arm}}'
EX_X86='{{ex_x86}}'
BB_ARM={{bb_arm}}
BB_X86={{bb_x86}}
";
