use miette::Result;

fn main() -> Result<()> {
    vgtree::cli::run()
}
