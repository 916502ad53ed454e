pub mod argparse;
mod debug_utils;
mod generate;
mod helpers;
