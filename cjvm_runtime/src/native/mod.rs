//! Native method implementations: the handful of `java.lang`/`java.security`/`sun.reflect`
//! methods bytecode can never implement itself because they reach into the runtime
//! directly (identity hash codes, array copies, reflection, wall-clock time).

mod java_lang_class;
mod java_lang_invoke_method_handle_natives;
mod java_lang_object;
mod java_lang_string;
mod java_lang_system;
mod java_lang_thread;
mod java_lang_throwable;
mod java_security_access_controller;
mod registry;
mod sun_reflect_reflection;

pub(crate) use registry::registry;
