//! Gradle integration
//!
//! Maps descriptors onto Gradle task names and renders a plan as a Kotlin
//! DSL fragment for `app/build.gradle.kts`.

use crate::descriptor::{ArtifactKind, BuildType};
use crate::parser::parse_descriptor;
use crate::plan::BuildPlan;
use buildplan_core::{Error, Result};
use std::fmt::Write;

/// ProGuard files shipped with the Android Gradle Plugin
const DEFAULT_PROGUARD_FILES: [&str; 2] = ["proguard-android.txt", "proguard-android-optimize.txt"];

/// Gradle task that produces the artifact (`assembleDebug`, `bundleRelease`, ...)
pub fn task_name(build_type: BuildType, artifact: ArtifactKind) -> String {
    let verb = match artifact {
        ArtifactKind::Apk => "assemble",
        ArtifactKind::Aab => "bundle",
    };
    let variant = match build_type {
        BuildType::Debug => "Debug",
        BuildType::Release => "Release",
    };
    format!("{verb}{variant}")
}

/// Quote a string as a Kotlin string literal
///
/// Control characters never appear raw in the output.
fn kotlin_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn proguard_file(name: &str) -> String {
    if DEFAULT_PROGUARD_FILES.contains(&name) {
        format!("getDefaultProguardFile({})", kotlin_string(name))
    } else {
        kotlin_string(name)
    }
}

/// Render the plan as Kotlin DSL
pub fn render(plan: &BuildPlan) -> Result<String> {
    let d = parse_descriptor(&plan.descriptor).map_err(|e| {
        Error::emit(format!("Plan descriptor section is invalid: {e}")).with_source(e)
    })?;
    let mut lines = Vec::new();

    lines.push(format!("// Generated by buildplan; task: {}", plan.gradle_task));
    lines.push("android {".to_string());
    lines.push(format!("    namespace = {}", kotlin_string(&d.namespace)));
    lines.push(format!("    compileSdk = {}", d.compile_sdk));
    if let Some(ndk) = &d.ndk_version {
        lines.push(format!("    ndkVersion = {}", kotlin_string(ndk)));
    }
    if let Some(tools) = &d.build_tools_version {
        lines.push(format!("    buildToolsVersion = {}", kotlin_string(tools)));
    }

    lines.push(String::new());
    lines.push("    compileOptions {".to_string());
    if d.core_library_desugaring {
        lines.push("        isCoreLibraryDesugaringEnabled = true".to_string());
    }
    let java = d.java_version.gradle_constant();
    lines.push(format!("        sourceCompatibility = JavaVersion.{java}"));
    lines.push(format!("        targetCompatibility = JavaVersion.{java}"));
    lines.push("    }".to_string());

    lines.push(String::new());
    lines.push("    kotlinOptions {".to_string());
    lines.push(format!(
        "        jvmTarget = JavaVersion.{}.toString()",
        d.jvm_target.gradle_constant()
    ));
    lines.push("    }".to_string());

    lines.push(String::new());
    lines.push("    defaultConfig {".to_string());
    lines.push(format!("        applicationId = {}", kotlin_string(&d.application_id)));
    lines.push(format!("        minSdk = {}", d.min_sdk));
    lines.push(format!("        targetSdk = {}", d.target_sdk));
    lines.push(format!("        versionCode = {}", d.version_code));
    lines.push(format!("        versionName = {}", kotlin_string(&d.version_name)));
    lines.push("    }".to_string());

    if plan.signing.name != "debug" {
        // Key material is wired up outside the build script
        lines.push(String::new());
        lines.push("    signingConfigs {".to_string());
        lines.push(format!("        maybeCreate({})", kotlin_string(&plan.signing.name)));
        lines.push("    }".to_string());
    }

    lines.push(String::new());
    lines.push("    buildTypes {".to_string());
    lines.push(format!("        {} {{", d.build_type));
    lines.push(format!("            isMinifyEnabled = {}", d.minify));
    lines.push(format!(
        "            signingConfig = signingConfigs.getByName({})",
        kotlin_string(&plan.signing.name)
    ));
    if !d.proguard_files.is_empty() {
        let files: Vec<_> = d.proguard_files.iter().map(|f| proguard_file(f.as_str())).collect();
        lines.push(format!("            proguardFiles({})", files.join(", ")));
    }
    lines.push("        }".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());

    if !d.dependencies.is_empty() {
        lines.push(String::new());
        lines.push("dependencies {".to_string());
        for dep in &d.dependencies {
            lines.push(format!("    {}({})", dep.scope, kotlin_string(&dep.coordinate())));
        }
        lines.push("}".to_string());
    }

    lines.push(String::new());
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SigningRegistry;
    use crate::parser::RawConfig;
    use crate::plan::emit;
    use crate::validate::validate;
    use buildplan_core::ErrorCode;
    use serde_json::{json, Value};

    fn plan(overrides: Value, registry: &SigningRegistry) -> BuildPlan {
        let mut raw: RawConfig = match json!({
            "applicationId": "com.mysahara.my_sahara_app",
            "minSdk": 24,
            "targetSdk": 36,
            "compileSdk": 36,
            "buildToolsVersion": "34.0.0",
            "signing": "debug",
            "coreLibraryDesugaring": true,
            "dependencies": [{
                "coordinate": "com.android.tools:desugar_jdk_libs:1.2.2",
                "scope": "coreLibraryDesugaring"
            }]
        }) {
            Value::Object(map) => map.into_iter().collect(),
            _ => unreachable!(),
        };
        if let Value::Object(map) = overrides {
            raw.extend(map);
        }
        let descriptor = parse_descriptor(&raw).unwrap();
        emit(&validate(descriptor, registry).unwrap())
    }

    fn debug_registry() -> SigningRegistry {
        SigningRegistry::new().with_identity("debug", "~/.android/debug.keystore")
    }

    #[test]
    fn test_task_names() {
        assert_eq!(task_name(BuildType::Debug, ArtifactKind::Apk), "assembleDebug");
        assert_eq!(task_name(BuildType::Release, ArtifactKind::Apk), "assembleRelease");
        assert_eq!(task_name(BuildType::Debug, ArtifactKind::Aab), "bundleDebug");
        assert_eq!(task_name(BuildType::Release, ArtifactKind::Aab), "bundleRelease");
    }

    #[test]
    fn test_kotlin_string_escaping() {
        assert_eq!(kotlin_string("plain"), "\"plain\"");
        assert_eq!(kotlin_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(kotlin_string("${x}"), "\"\\${x}\"");
    }

    #[test]
    fn test_kotlin_string_escapes_control_characters() {
        assert_eq!(kotlin_string("1.0\r\t"), "\"1.0\\r\\t\"");
        assert_eq!(kotlin_string("a\u{7}b"), "\"a\\u0007b\"");
        assert_eq!(kotlin_string("\u{8}\u{7f}"), "\"\\b\\u007f\"");
    }

    #[test]
    fn test_render_never_emits_raw_control_characters() {
        let mut plan = plan(json!({}), &debug_registry());
        plan.signing.name = "up\rload\u{7}".to_string();

        let kts = render(&plan).unwrap();
        assert!(kts.contains("signingConfigs.getByName(\"up\\rload\\u0007\")"));
        assert!(!kts.chars().any(|c| c.is_control() && c != '\n'));
    }

    #[test]
    fn test_render_rejects_invalid_descriptor_section() {
        let mut plan = plan(json!({}), &debug_registry());
        plan.descriptor.insert("minSdk".to_string(), json!("twenty"));

        let err = render(&plan).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmitError);
        assert!(err.message.contains("minSdk"));
    }

    #[test]
    fn test_render_release_block() {
        let kts = render(&plan(json!({}), &debug_registry())).unwrap();

        assert!(kts.contains("namespace = \"com.mysahara.my_sahara_app\""));
        assert!(kts.contains("compileSdk = 36"));
        assert!(kts.contains("buildToolsVersion = \"34.0.0\""));
        assert!(kts.contains("isCoreLibraryDesugaringEnabled = true"));
        assert!(kts.contains("sourceCompatibility = JavaVersion.VERSION_1_8"));
        assert!(kts.contains("jvmTarget = JavaVersion.VERSION_1_8.toString()"));
        assert!(kts.contains("        release {"));
        assert!(kts.contains("isMinifyEnabled = true"));
        assert!(kts.contains("signingConfig = signingConfigs.getByName(\"debug\")"));
        assert!(kts.contains(
            "proguardFiles(getDefaultProguardFile(\"proguard-android.txt\"), \"proguard-rules.pro\")"
        ));
        assert!(kts.contains(
            "coreLibraryDesugaring(\"com.android.tools:desugar_jdk_libs:1.2.2\")"
        ));
        assert!(!kts.contains("signingConfigs {"));
    }

    #[test]
    fn test_render_custom_signing_identity() {
        let registry = debug_registry().with_identity("upload", "env:UPLOAD_KEYSTORE");
        let kts = render(&plan(json!({ "signing": "upload" }), &registry)).unwrap();

        assert!(kts.contains("maybeCreate(\"upload\")"));
        assert!(kts.contains("signingConfigs.getByName(\"upload\")"));
        assert!(!kts.contains("UPLOAD_KEYSTORE"));
    }

    #[test]
    fn test_render_debug_build_without_minify() {
        let kts = render(&plan(
            json!({ "buildType": "debug", "ndkVersion": "27.0.12077973" }),
            &debug_registry(),
        ))
        .unwrap();

        assert!(kts.contains("task: assembleDebug"));
        assert!(kts.contains("        debug {"));
        assert!(kts.contains("isMinifyEnabled = false"));
        assert!(!kts.contains("proguardFiles("));
        assert!(kts.contains("ndkVersion = \"27.0.12077973\""));
    }
}
