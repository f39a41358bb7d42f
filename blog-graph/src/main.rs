//! Main entry point for CLI command to start server.

fn main() -> anyhow::Result<()> {
    blog_graph::main()
}
