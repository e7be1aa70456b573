//! Cross-field descriptor validation
//!
//! Checks run in a fixed order and stop at the first violation:
//!
//! 1. `minSdk <= targetSdk <= compileSdk`
//! 2. the signing reference names a known identity
//! 3. every dependency coordinate is well formed
//! 4. desugaring flag and desugaring dependency agree
//! 5. minified builds list at least one ProGuard file

use crate::descriptor::{BuildDescriptor, DependencyScope, SigningIdentity, SigningRegistry};
use crate::error::{ValidationError, ValidationErrorKind};
use crate::schema::KeyName;
use tracing::debug;

/// A descriptor that passed every check, with its signing identity resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDescriptor {
    descriptor: BuildDescriptor,
    signing: SigningIdentity,
}

impl ValidatedDescriptor {
    /// The validated descriptor
    pub fn descriptor(&self) -> &BuildDescriptor {
        &self.descriptor
    }

    /// The identity the `signing` key resolved to
    pub fn signing_identity(&self) -> &SigningIdentity {
        &self.signing
    }
}

/// Validate a parsed descriptor against the known signing identities
pub fn validate(
    descriptor: BuildDescriptor,
    registry: &SigningRegistry,
) -> Result<ValidatedDescriptor, ValidationError> {
    check_sdk_ordering(&descriptor)?;
    let signing = resolve_signing(&descriptor, registry)?;
    check_dependencies(&descriptor)?;
    check_desugaring(&descriptor)?;
    check_proguard(&descriptor)?;

    debug!(
        application_id = %descriptor.application_id,
        signing = %signing.name,
        "Descriptor validated"
    );

    Ok(ValidatedDescriptor {
        descriptor,
        signing,
    })
}

fn check_sdk_ordering(d: &BuildDescriptor) -> Result<(), ValidationError> {
    if d.min_sdk > d.target_sdk {
        return Err(ValidationError::new(
            ValidationErrorKind::SdkOrdering,
            KeyName::MinSdk.as_str(),
            format!(
                "minSdk {} is greater than targetSdk {}",
                d.min_sdk, d.target_sdk
            ),
        ));
    }
    if d.target_sdk > d.compile_sdk {
        return Err(ValidationError::new(
            ValidationErrorKind::SdkOrdering,
            KeyName::TargetSdk.as_str(),
            format!(
                "targetSdk {} is greater than compileSdk {}",
                d.target_sdk, d.compile_sdk
            ),
        ));
    }
    Ok(())
}

fn resolve_signing(
    d: &BuildDescriptor,
    registry: &SigningRegistry,
) -> Result<SigningIdentity, ValidationError> {
    registry.resolve(&d.signing).cloned().ok_or_else(|| {
        let known: Vec<_> = registry.names().collect();
        let message = if known.is_empty() {
            format!("no signing identity named `{}` (none declared)", d.signing)
        } else {
            format!(
                "no signing identity named `{}` (known: {})",
                d.signing,
                known.join(", ")
            )
        };
        ValidationError::new(
            ValidationErrorKind::UnknownSigningIdentity,
            KeyName::Signing.as_str(),
            message,
        )
    })
}

fn is_well_formed_part(part: &str) -> bool {
    !part.is_empty() && !part.contains(':') && !part.chars().any(char::is_whitespace)
}

fn check_dependencies(d: &BuildDescriptor) -> Result<(), ValidationError> {
    for (index, dep) in d.dependencies.iter().enumerate() {
        let bad_part = [
            ("group", &dep.group),
            ("artifact", &dep.artifact),
            ("version", &dep.version),
        ]
        .into_iter()
        .find(|(_, value)| !is_well_formed_part(value));

        if let Some((part, _)) = bad_part {
            return Err(ValidationError::new(
                ValidationErrorKind::MalformedDependency,
                format!("{}[{index}]", KeyName::Dependencies),
                format!("`{}` has an empty or invalid {part}", dep.coordinate()),
            ));
        }
    }
    Ok(())
}

fn check_desugaring(d: &BuildDescriptor) -> Result<(), ValidationError> {
    let has_desugar_lib = d
        .dependencies
        .iter()
        .any(|dep| dep.scope == DependencyScope::CoreLibraryDesugaring);

    match (d.core_library_desugaring, has_desugar_lib) {
        (true, false) => Err(ValidationError::new(
            ValidationErrorKind::DesugaringMismatch,
            KeyName::CoreLibraryDesugaring.as_str(),
            "desugaring is enabled but no coreLibraryDesugaring dependency is declared",
        )),
        (false, true) => Err(ValidationError::new(
            ValidationErrorKind::DesugaringMismatch,
            KeyName::Dependencies.as_str(),
            "a coreLibraryDesugaring dependency is declared but desugaring is disabled",
        )),
        _ => Ok(()),
    }
}

fn check_proguard(d: &BuildDescriptor) -> Result<(), ValidationError> {
    if d.minify && d.proguard_files.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::MissingProguardRules,
            KeyName::ProguardFiles.as_str(),
            "minify is enabled but no ProGuard files are listed",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_descriptor, RawConfig};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn descriptor(overrides: Value) -> BuildDescriptor {
        let mut raw: RawConfig = match json!({
            "applicationId": "com.example.app",
            "minSdk": 21,
            "targetSdk": 36,
            "compileSdk": 36,
            "signing": "debug",
            "minify": true
        }) {
            Value::Object(map) => map.into_iter().collect(),
            _ => unreachable!(),
        };
        if let Value::Object(map) = overrides {
            raw.extend(map);
        }
        parse_descriptor(&raw).unwrap()
    }

    fn debug_registry() -> SigningRegistry {
        SigningRegistry::new().with_identity("debug", "~/.android/debug.keystore")
    }

    #[test]
    fn test_valid_descriptor() {
        let validated = validate(descriptor(json!({})), &debug_registry()).unwrap();
        assert_eq!(validated.signing_identity().name, "debug");
        assert_eq!(validated.descriptor().compile_sdk, 36);
    }

    #[test]
    fn test_min_sdk_above_target_sdk() {
        let err = validate(
            descriptor(json!({ "minSdk": 30, "targetSdk": 21 })),
            &debug_registry(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::SdkOrdering);
        assert_eq!(err.field, "minSdk");
    }

    #[test]
    fn test_target_sdk_above_compile_sdk() {
        let err = validate(
            descriptor(json!({ "targetSdk": 36, "compileSdk": 35 })),
            &debug_registry(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::SdkOrdering);
        assert_eq!(err.field, "targetSdk");
    }

    #[test]
    fn test_unknown_signing_identity() {
        let err = validate(descriptor(json!({ "signing": "release" })), &debug_registry())
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::UnknownSigningIdentity);
        assert_eq!(err.field, "signing");
        assert!(err.message.contains("known: debug"));
    }

    #[test]
    fn test_sdk_ordering_checked_before_signing() {
        let err = validate(
            descriptor(json!({ "minSdk": 30, "targetSdk": 21, "signing": "release" })),
            &debug_registry(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::SdkOrdering);
    }

    #[test]
    fn test_malformed_dependency() {
        let err = validate(
            descriptor(json!({
                "dependencies": ["androidx.core:core-ktx:1.13.1", "androidx.appcompat:appcompat"]
            })),
            &debug_registry(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MalformedDependency);
        assert_eq!(err.field, "dependencies[1]");
        assert!(err.message.contains("version"));
    }

    #[test]
    fn test_dependency_with_extra_parts_is_malformed() {
        let err = validate(
            descriptor(json!({ "dependencies": ["a:b:1.0:sources"] })),
            &debug_registry(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MalformedDependency);
    }

    #[test]
    fn test_desugaring_requires_library() {
        let err = validate(
            descriptor(json!({ "coreLibraryDesugaring": true })),
            &debug_registry(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::DesugaringMismatch);

        let ok = validate(
            descriptor(json!({
                "coreLibraryDesugaring": true,
                "dependencies": [{
                    "coordinate": "com.android.tools:desugar_jdk_libs:1.2.2",
                    "scope": "coreLibraryDesugaring"
                }]
            })),
            &debug_registry(),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_desugaring_library_requires_flag() {
        let err = validate(
            descriptor(json!({
                "dependencies": [{
                    "coordinate": "com.android.tools:desugar_jdk_libs:1.2.2",
                    "scope": "coreLibraryDesugaring"
                }]
            })),
            &debug_registry(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::DesugaringMismatch);
        assert_eq!(err.field, "dependencies");
    }

    #[test]
    fn test_minify_without_proguard_files() {
        let err = validate(
            descriptor(json!({ "proguardFiles": [] })),
            &debug_registry(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingProguardRules);
    }

    proptest! {
        #[test]
        fn prop_validated_descriptors_keep_sdk_order(
            min in 1u32..=99,
            target in 1u32..=99,
            compile in 1u32..=99,
        ) {
            let d = descriptor(json!({
                "minSdk": min,
                "targetSdk": target,
                "compileSdk": compile,
            }));

            match validate(d, &debug_registry()) {
                Ok(v) => {
                    let d = v.descriptor();
                    prop_assert!(d.min_sdk <= d.target_sdk && d.target_sdk <= d.compile_sdk);
                }
                Err(e) => {
                    prop_assert_eq!(e.kind, ValidationErrorKind::SdkOrdering);
                    prop_assert!(min > target || target > compile);
                }
            }
        }
    }
}
