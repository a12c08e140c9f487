//! nb2report CLI entry point

fn main() {
    nb2report::cli::run();
}
