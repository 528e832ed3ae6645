/// Delegates to nih_plug_xtask for the `bundle` subcommand:
///
///   cargo xtask bundle ping-pong-delay --release
///
/// Builds the plugin as a cdylib and packages it as
/// `target/bundled/Ping-Pong Delay.vst3` and `.clap`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
