use arg_parser::CmdArgs;

#[derive(CmdArgs, Debug, Default, PartialEq)]
#[metadata(description = "Lox scanner and expression parser. Starts a prompt when no file is given.")]
pub struct Options {
    #[arg(
        short = "-f",
        long = "--file",
        description = "The script to scan and parse"
    )]
    pub file: Option<String>,

    #[arg(
        short = "-t",
        long = "--tokens",
        description = "Print every scanned token"
    )]
    pub log_tokens: bool,

    #[arg(
        short = "-a",
        long = "--ast",
        description = "Print the parsed expression when running a file"
    )]
    pub log_ast: bool,
}
