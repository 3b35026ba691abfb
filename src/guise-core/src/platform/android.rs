//! Android identity writer over `android.os.Build` statics.
//!
//! Uses JNI to rewrite the `Build` class fields the same way the framework
//! reads them. The host must hand over its `JavaVM` once, early, before the
//! engine is constructed.

use std::sync::OnceLock;

use jni::objects::{JClass, JString, JValue};
use jni::{AttachGuard, JavaVM};
use tracing::debug;

use crate::error::GuiseError;
use crate::profile::{BuildField, BuildIdentity};
use crate::writer::IdentityWriter;

/// Global JavaVM reference, set during JNI_OnLoad or explicit initialization.
static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

const BUILD_CLASS: &str = "android/os/Build";
const STRING_SIG: &str = "Ljava/lang/String;";

/// Hand the JavaVM to the writer. Call once from `JNI_OnLoad`; later calls
/// are ignored.
pub fn init_java_vm(vm: JavaVM) {
    let _ = JAVA_VM.set(vm);
}

fn vm() -> Result<&'static JavaVM, GuiseError> {
    JAVA_VM.get().ok_or_else(|| GuiseError::IdentityUnavailable {
        reason: "JavaVM not initialized".to_string(),
    })
}

fn attach(vm: &'static JavaVM) -> Result<AttachGuard<'static>, GuiseError> {
    vm.attach_current_thread()
        .map_err(|e| GuiseError::IdentityUnavailable {
            reason: format!("attach_current_thread: {e}"),
        })
}

/// Identity writer over the `android.os.Build` static fields.
pub struct BuildClassWriter;

impl BuildClassWriter {
    /// Create the writer, verifying the JavaVM is in place and the Build
    /// class resolves.
    pub fn new() -> Result<Self, GuiseError> {
        let vm = vm()?;
        let mut env = attach(vm)?;
        env.find_class(BUILD_CLASS)
            .map_err(|e| GuiseError::IdentityUnavailable {
                reason: format!("find_class {BUILD_CLASS}: {e}"),
            })?;
        Ok(Self)
    }

    fn read_field(
        env: &mut jni::JNIEnv<'_>,
        class: &JClass<'_>,
        field: BuildField,
    ) -> Result<String, GuiseError> {
        let unavailable = |reason: String| GuiseError::IdentityUnavailable { reason };
        let value = env
            .get_static_field(class, field.name(), STRING_SIG)
            .and_then(|v| v.l())
            .map_err(|e| unavailable(format!("get_static_field {field}: {e}")))?;
        let jstr = JString::from(value);
        let text = env
            .get_string(&jstr)
            .map_err(|e| unavailable(format!("get_string {field}: {e}")))?;
        Ok(text.into())
    }
}

impl IdentityWriter for BuildClassWriter {
    fn set_field(&self, field: BuildField, value: &str) -> Result<(), GuiseError> {
        let write_failed = |reason: String| GuiseError::FieldWriteFailed {
            field: field.name(),
            reason,
        };
        let vm = vm().map_err(|e| write_failed(e.to_string()))?;
        let mut env = attach(vm).map_err(|e| write_failed(e.to_string()))?;
        let class = env
            .find_class(BUILD_CLASS)
            .map_err(|e| write_failed(format!("find_class: {e}")))?;
        let field_id = env
            .get_static_field_id(&class, field.name(), STRING_SIG)
            .map_err(|e| write_failed(format!("get_static_field_id: {e}")))?;
        let replacement = env
            .new_string(value)
            .map_err(|e| write_failed(format!("new_string: {e}")))?;
        env.set_static_field(&class, field_id, JValue::Object(&replacement))
            .map_err(|e| write_failed(format!("set_static_field: {e}")))?;
        debug!(field = field.name(), value, "Build field overwritten");
        Ok(())
    }

    fn snapshot(&self) -> Result<BuildIdentity, GuiseError> {
        let vm = vm()?;
        let mut env = attach(vm)?;
        let class = env
            .find_class(BUILD_CLASS)
            .map_err(|e| GuiseError::IdentityUnavailable {
                reason: format!("find_class: {e}"),
            })?;
        Ok(BuildIdentity::new(
            Self::read_field(&mut env, &class, BuildField::Device)?,
            Self::read_field(&mut env, &class, BuildField::Product)?,
            Self::read_field(&mut env, &class, BuildField::Model)?,
            Self::read_field(&mut env, &class, BuildField::Fingerprint)?,
        ))
    }
}
