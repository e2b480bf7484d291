mod command;
mod host;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
