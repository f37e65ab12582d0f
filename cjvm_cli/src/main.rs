mod argument;
mod logging;
mod version;

use argument::Arguments;
use cjvm_runtime::{ConfigurationBuilder, VM};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let arguments = Arguments::parse();

    if arguments.version {
        println!("{}", version::full());
        return ExitCode::SUCCESS;
    }

    logging::initialize(arguments.verbose);

    match run(&arguments) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            eprintln!("Exception: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(arguments: &Arguments) -> cjvm_runtime::Result<()> {
    let class_path = arguments.class_path();
    let mut builder =
        ConfigurationBuilder::new().class_path(if class_path.is_empty() { "." } else { &class_path });

    if let Some(main_class) = &arguments.mainclass {
        builder = builder.main_class(main_class.clone());
    }
    builder = builder.arguments(arguments.parameters.clone());

    let configuration = builder.build()?;
    let vm = VM::new(configuration)?;
    vm.run()
}
