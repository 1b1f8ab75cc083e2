//! The built-in field table
//!
//! Maps nested log records onto the flat ClickHouse column layout. Order is
//! significant: it is the key order of every flattened output object.

use crate::error::SchemaError;
use crate::flatten::types::{DefaultPolicy, SchemaEntry};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static OUTPUT_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()
});

/// Column table for merged device logs
pub const SCHEMA: &[SchemaEntry] = &[
    SchemaEntry::new("timestamp", &["@timestamp"], DefaultPolicy::CurrentTimestamp),
    SchemaEntry::nullable("tag", &["tag"]),
    SchemaEntry::nullable("identifiedWith", &["identifiedWith"]),
    SchemaEntry::nullable("correlationId", &["correlationId"]),
    SchemaEntry::nullable("platform", &["platform"]),
    SchemaEntry::nullable("sdkIdentifier", &["sdkIdentifier"]),
    SchemaEntry::nullable("sdkPlatform", &["sdkPlatform"]),
    SchemaEntry::nullable("sdkVersion", &["sdkVersion"]),
    SchemaEntry::nullable("sdkState_beatExecutionState", &["sdkState", "beatExecutionState"]),
    SchemaEntry::nullable("sdkState_controlExecutionState", &["sdkState", "controlExecutionState"]),
    SchemaEntry::nullable("instanceId", &["instanceId"]),
    SchemaEntry::nullable("sessionId", &["sessionId"]),
    SchemaEntry::nullable("watcherMail", &["watcherMail"]),
    SchemaEntry::nullable("occurence", &["occurence"]),
    SchemaEntry::nullable("appInfo_alternativeCertHashes", &["appInfo", "alternativeCertHashes"]),
    SchemaEntry::nullable("appInfo_appIdentifier", &["appInfo", "appIdentifier"]),
    SchemaEntry::nullable("appInfo_appVersion", &["appInfo", "appVersion"]),
    SchemaEntry::nullable("appInfo_applicationIdentifier", &["appInfo", "applicationIdentifier"]),
    SchemaEntry::nullable("appInfo_certHash", &["appInfo", "certHash"]),
    SchemaEntry::nullable("appInfo_installationSource", &["appInfo", "installationSource"]),
    SchemaEntry::nullable("appInfo_installedFromUnofficialStore", &["appInfo", "installedFromUnofficialStore"]),
    SchemaEntry::nullable("deviceId_androidId", &["deviceId", "androidId"]),
    SchemaEntry::nullable("deviceId_fingerprintV3", &["deviceId", "fingerprintV3"]),
    SchemaEntry::nullable("deviceId_mediaDrm", &["deviceId", "mediaDrm"]),
    SchemaEntry::nullable("deviceId_currentVendorId", &["deviceId", "currentVendorId"]),
    SchemaEntry::nullable("deviceId_oldVendorId", &["deviceId", "oldVendorId"]),
    SchemaEntry::nullable("defaultDeviceId", &["defaultDeviceId"]),
    SchemaEntry::nullable("deviceInfo_manufacturer", &["deviceInfo", "manufacturer"]),
    SchemaEntry::nullable("deviceInfo_model", &["deviceInfo", "model"]),
    SchemaEntry::nullable("deviceInfo_osVersion", &["deviceInfo", "osVersion"]),
    SchemaEntry::nullable("deviceState_biometrics", &["deviceState", "biometrics"]),
    SchemaEntry::nullable("deviceState_hasGoogleMobileServices", &["deviceState", "hasGoogleMobileServices"]),
    SchemaEntry::nullable("deviceState_hasHuaweiMobileServices", &["deviceState", "hasHuaweiMobileServices"]),
    SchemaEntry::nullable("deviceState_hwBackedKeychain", &["deviceState", "hwBackedKeychain"]),
    SchemaEntry::nullable("deviceState_isVerifyAppsEnabled", &["deviceState", "isVerifyAppsEnabled"]),
    SchemaEntry::nullable("deviceState_security", &["deviceState", "security"]),
    SchemaEntry::nullable("deviceState_securityPatch", &["deviceState", "securityPatch"]),
    SchemaEntry::nullable("deviceState_isAdbEnabled", &["deviceState", "isAdbEnabled"]),
    SchemaEntry::nullable("deviceState_selinuxProperties_bootSelinuxProperty", &["deviceState", "selinuxProperties", "bootSelinuxProperty"]),
    SchemaEntry::nullable("deviceState_selinuxProperties_buildSelinuxProperty", &["deviceState", "selinuxProperties", "buildSelinuxProperty"]),
    SchemaEntry::nullable("deviceState_selinuxProperties_selinuxEnabledReflect", &["deviceState", "selinuxProperties", "selinuxEnabledReflect"]),
    SchemaEntry::nullable("deviceState_selinuxProperties_selinuxEnforcedReflect", &["deviceState", "selinuxProperties", "selinuxEnforcedReflect"]),
    SchemaEntry::nullable("deviceState_selinuxProperties_selinuxEnforcementFileContent", &["deviceState", "selinuxProperties", "selinuxEnforcementFileContent"]),
    SchemaEntry::nullable("deviceState_selinuxProperties_selinuxMode", &["deviceState", "selinuxProperties", "selinuxMode"]),
    SchemaEntry::nullable("configVersion", &["configVersion"]),
    SchemaEntry::nullable("dynamicConfigVersion", &["dynamicConfigVersion"]),
    SchemaEntry::nullable("externalId", &["externalId"]),
    SchemaEntry::nullable("geolocation_asOrganization", &["geolocation", "asOrganization"]),
    SchemaEntry::nullable("geolocation_city", &["geolocation", "city"]),
    SchemaEntry::nullable("geolocation_continent", &["geolocation", "continent"]),
    SchemaEntry::nullable("geolocation_country", &["geolocation", "country"]),
    SchemaEntry::nullable("geolocation_ip", &["geolocation", "ip"]),
    SchemaEntry::nullable("geolocation_latitude", &["geolocation", "latitude"]),
    SchemaEntry::nullable("geolocation_longitude", &["geolocation", "longitude"]),
    SchemaEntry::nullable("geolocation_postalCode", &["geolocation", "postalCode"]),
    SchemaEntry::nullable("geolocation_region", &["geolocation", "region"]),
    SchemaEntry::nullable("geolocation_regionCode", &["geolocation", "regionCode"]),
    SchemaEntry::nullable("geolocation_timezone", &["geolocation", "timezone"]),
    SchemaEntry::nullable("loggingSslPinning", &["loggingSslPinning"]),
    SchemaEntry::nullable("accessibilityApps", &["accessibilityApps"]),
    SchemaEntry::nullable("checks_monitoring_status", &["checks", "monitoring", "status"]),
    SchemaEntry::nullable("checks_monitoring_timeMs", &["checks", "monitoring", "timeMs"]),
    SchemaEntry::nullable("checks_accessibility_status", &["checks", "accessibility", "status"]),
    SchemaEntry::nullable("checks_accessibility_timeMs", &["checks", "accessibility", "timeMs"]),
    SchemaEntry::nullable("checks_appIntegrity_status", &["checks", "appIntegrity", "status"]),
    SchemaEntry::nullable("checks_appIntegrity_timeMs", &["checks", "appIntegrity", "timeMs"]),
    SchemaEntry::nullable("checks_debug_status", &["checks", "debug", "status"]),
    SchemaEntry::nullable("checks_debug_timeMs", &["checks", "debug", "timeMs"]),
    SchemaEntry::nullable("checks_devMode_status", &["checks", "devMode", "status"]),
    SchemaEntry::nullable("checks_devMode_timeMs", &["checks", "devMode", "timeMs"]),
    SchemaEntry::nullable("checks_deviceBinding_status", &["checks", "deviceBinding", "status"]),
    SchemaEntry::nullable("checks_deviceBinding_timeMs", &["checks", "deviceBinding", "timeMs"]),
    SchemaEntry::nullable("checks_hooks_status", &["checks", "hooks", "status"]),
    SchemaEntry::nullable("checks_hooks_timeMs", &["checks", "hooks", "timeMs"]),
    SchemaEntry::nullable("checks_malware_status", &["checks", "malware", "status"]),
    SchemaEntry::nullable("checks_malware_timeMs", &["checks", "malware", "timeMs"]),
    SchemaEntry::nullable("checks_obfuscationIssues_status", &["checks", "obfuscationIssues", "status"]),
    SchemaEntry::nullable("checks_obfuscationIssues_timeMs", &["checks", "obfuscationIssues", "timeMs"]),
    SchemaEntry::nullable("checks_overlay_status", &["checks", "overlay", "status"]),
    SchemaEntry::nullable("checks_overlay_timeMs", &["checks", "overlay", "timeMs"]),
    SchemaEntry::nullable("checks_privilegedAccess_status", &["checks", "privilegedAccess", "status"]),
    SchemaEntry::nullable("checks_privilegedAccess_timeMs", &["checks", "privilegedAccess", "timeMs"]),
    SchemaEntry::nullable("checks_simulator_status", &["checks", "simulator", "status"]),
    SchemaEntry::nullable("checks_simulator_timeMs", &["checks", "simulator", "timeMs"]),
    SchemaEntry::nullable("checks_systemVPN_status", &["checks", "systemVPN", "status"]),
    SchemaEntry::nullable("checks_systemVPN_timeMs", &["checks", "systemVPN", "timeMs"]),
    SchemaEntry::nullable("checks_screenCapture_status", &["checks", "screenCapture", "status"]),
    SchemaEntry::nullable("checks_screenCapture_timeMs", &["checks", "screenCapture", "timeMs"]),
    SchemaEntry::nullable("checks_unofficialStore_status", &["checks", "unofficialStore", "status"]),
    SchemaEntry::nullable("checks_unofficialStore_timeMs", &["checks", "unofficialStore", "timeMs"]),
    SchemaEntry::nullable("checks_adbEnabled_status", &["checks", "adbEnabled", "status"]),
    SchemaEntry::nullable("checks_adbEnabled_timeMs", &["checks", "adbEnabled", "timeMs"]),
    SchemaEntry::nullable("checks_screenRecording_status", &["checks", "screenRecording", "status"]),
    SchemaEntry::nullable("checks_screenRecording_timeMs", &["checks", "screenRecording", "timeMs"]),
    SchemaEntry::nullable("checks_screenshot_status", &["checks", "screenshot", "status"]),
    SchemaEntry::nullable("checks_screenshot_timeMs", &["checks", "screenshot", "timeMs"]),
    SchemaEntry::nullable("incidentReport_type", &["incidentReport", "type"]),
    SchemaEntry::nullable("incidentReport_info_executionState", &["incidentReport", "info", "executionState"]),
    SchemaEntry::nullable("incidentReport_info_sdkIntegrityCompromised", &["incidentReport", "info", "sdkIntegrityCompromised"]),
    SchemaEntry::nullable("incidentReport_info_featureTestingIgnored", &["incidentReport", "info", "featureTestingIgnored"]),
    SchemaEntry::nullable("incidentReport_info_apiMethodNameNotObfuscated", &["incidentReport", "info", "apiMethodNameNotObfuscated"]),
    SchemaEntry::nullable("incidentReport_info_appIntegrityCheckError", &["incidentReport", "info", "appIntegrityCheckError"]),
    SchemaEntry::nullable("incidentReport_info_areApksAvailable", &["incidentReport", "info", "areApksAvailable"]),
    SchemaEntry::nullable("incidentReport_info_areBinariesPresent", &["incidentReport", "info", "areBinariesPresent"]),
    SchemaEntry::nullable("incidentReport_info_areFilesPresent", &["incidentReport", "info", "areFilesPresent"]),
    SchemaEntry::nullable("incidentReport_info_areFoldersWritable", &["incidentReport", "info", "areFoldersWritable"]),
    SchemaEntry::nullable("incidentReport_info_areFridaLibrariesDetected", &["incidentReport", "info", "areFridaLibrariesDetected"]),
    SchemaEntry::nullable("incidentReport_info_areTestKeysEnabled", &["incidentReport", "info", "areTestKeysEnabled"]),
    SchemaEntry::nullable("incidentReport_info_canExecuteCommand", &["incidentReport", "info", "canExecuteCommand"]),
    SchemaEntry::nullable("incidentReport_info_canExecuteCommandUsingWhich", &["incidentReport", "info", "canExecuteCommandUsingWhich"]),
    SchemaEntry::nullable("incidentReport_info_androidCertificateInfo", &["incidentReport", "info", "certificateInfo"]),
    SchemaEntry::nullable("incidentReport_info_checkEmulatorBrand", &["incidentReport", "info", "checkEmulatorBrand"]),
    SchemaEntry::nullable("incidentReport_info_checkEmulatorDevice", &["incidentReport", "info", "checkEmulatorDevice"]),
    SchemaEntry::nullable("incidentReport_info_checkEmulatorFingerprint", &["incidentReport", "info", "checkEmulatorFingerprint"]),
    SchemaEntry::nullable("incidentReport_info_checkEmulatorHardware", &["incidentReport", "info", "checkEmulatorHardware"]),
    SchemaEntry::nullable("incidentReport_info_checkEmulatorManufacturer", &["incidentReport", "info", "checkEmulatorManufacturer"]),
    SchemaEntry::nullable("incidentReport_info_checkEmulatorModel", &["incidentReport", "info", "checkEmulatorModel"]),
    SchemaEntry::nullable("incidentReport_info_checkEmulatorProduct", &["incidentReport", "info", "checkEmulatorProduct"]),
    SchemaEntry::nullable("incidentReport_info_checkEmulatorPropertyValues", &["incidentReport", "info", "checkEmulatorPropertyValues"]),
    SchemaEntry::nullable("incidentReport_info_checkEmulatorUser", &["incidentReport", "info", "checkEmulatorUser"]),
    SchemaEntry::nullable("incidentReport_info_checkFrameworks", &["incidentReport", "info", "checkFrameworks"]),
    SchemaEntry::nullable("incidentReport_info_checkLine1Number", &["incidentReport", "info", "checkLine1Number"]),
    SchemaEntry::nullable("incidentReport_info_checkNativeMethods", &["incidentReport", "info", "checkNativeMethods"]),
    SchemaEntry::nullable("incidentReport_info_checkPropertyDebuggable", &["incidentReport", "info", "checkPropertyDebuggable"]),
    SchemaEntry::nullable("incidentReport_info_checkPropertyWhichIsOnlyOnEmulator", &["incidentReport", "info", "checkPropertyWhichIsOnlyOnEmulator"]),
    SchemaEntry::nullable("incidentReport_info_checkSimSerial", &["incidentReport", "info", "checkSimSerial"]),
    SchemaEntry::nullable("incidentReport_info_checkStackTrace", &["incidentReport", "info", "checkStackTrace"]),
    SchemaEntry::nullable("incidentReport_info_checkSubsriberId", &["incidentReport", "info", "checkSubsriberId"]),
    SchemaEntry::nullable("incidentReport_info_checkVoiceMailNumber", &["incidentReport", "info", "checkVoiceMailNumber"]),
    SchemaEntry::nullable("incidentReport_info_componentHeartbeat", &["incidentReport", "info", "componentHeartbeat"]),
    SchemaEntry::nullable("incidentReport_info_detectSharedObjsAndJarsLoadedInMemory", &["incidentReport", "info", "detectSharedObjsAndJarsLoadedInMemory"]),
    SchemaEntry::nullable("incidentReport_info_didAndroidIdChange", &["incidentReport", "info", "didAndroidIdChange"]),
    SchemaEntry::nullable("incidentReport_info_didKeyStoreChange", &["incidentReport", "info", "didKeyStoreChange"]),
    SchemaEntry::nullable("incidentReport_info_fakeDeviceProfile", &["incidentReport", "info", "fakeDeviceProfile"]),
    SchemaEntry::nullable("incidentReport_info_fridaNative", &["incidentReport", "info", "fridaNative"]),
    SchemaEntry::nullable("incidentReport_info_hasInvalidSignatureDigest", &["incidentReport", "info", "hasInvalidSignatureDigest"]),
    SchemaEntry::nullable("incidentReport_info_hasInvalidSignatureDigestNative", &["incidentReport", "info", "hasInvalidSignatureDigestNative"]),
    SchemaEntry::nullable("incidentReport_info_hasMultipleSignatures", &["incidentReport", "info", "hasMultipleSignatures"]),
    SchemaEntry::nullable("incidentReport_info_hasTracerPid", &["incidentReport", "info", "hasTracerPid"]),
    SchemaEntry::nullable("incidentReport_info_incorrectPackageName", &["incidentReport", "info", "incorrectPackageName"]),
    SchemaEntry::nullable("incidentReport_info_incorrectPackageNameNative", &["incidentReport", "info", "incorrectPackageNameNative"]),
    SchemaEntry::nullable("incidentReport_info_isApplicationFlagEnabled", &["incidentReport", "info", "isApplicationFlagEnabled"]),
    SchemaEntry::nullable("incidentReport_info_isBuildConfigDebug", &["incidentReport", "info", "isBuildConfigDebug"]),
    SchemaEntry::nullable("incidentReport_info_isDebuggerConnected", &["incidentReport", "info", "isDebuggerConnected"]),
    SchemaEntry::nullable("incidentReport_info_isDeveloperModeEnabled", &["incidentReport", "info", "isDeveloperModeEnabled"]),
    SchemaEntry::nullable("incidentReport_info_isFridaProcessInProc", &["incidentReport", "info", "isFridaProcessInProc"]),
    SchemaEntry::nullable("incidentReport_info_isFridaServerListening", &["incidentReport", "info", "isFridaServerListening"]),
    SchemaEntry::nullable("incidentReport_info_isObscuredMotionEvent", &["incidentReport", "info", "isObscuredMotionEvent"]),
    SchemaEntry::nullable("incidentReport_info_isOtaCertificateMissing", &["incidentReport", "info", "isOtaCertificateMissing"]),
    SchemaEntry::nullable("incidentReport_info_isSElinuxInPermisiveMode", &["incidentReport", "info", "isSElinuxInPermisiveMode"]),
    SchemaEntry::nullable("incidentReport_info_isSafetyNetBypassDetected", &["incidentReport", "info", "isSafetyNetBypassDetected"]),
    SchemaEntry::nullable("incidentReport_info_isSystemPropertyEqualTo", &["incidentReport", "info", "isSystemPropertyEqualTo"]),
    SchemaEntry::nullable("incidentReport_info_isVpnRunning", &["incidentReport", "info", "isVpnRunning"]),
    SchemaEntry::nullable("incidentReport_info_isXposedVersionAvailable", &["incidentReport", "info", "isXposedVersionAvailable"]),
    SchemaEntry::nullable("incidentReport_info_malwarePackages", &["incidentReport", "info", "malwarePackages"]),
    SchemaEntry::nullable("incidentReport_info_overlayInstalledApps", &["incidentReport", "info", "overlayInstalledApps"]),
    SchemaEntry::nullable("incidentReport_info_rootNative", &["incidentReport", "info", "rootNative"]),
    SchemaEntry::nullable("incidentReport_info_unknownServices", &["incidentReport", "info", "unknownServices"]),
    SchemaEntry::nullable("incidentReport_info_unofficialInstallationSource", &["incidentReport", "info", "unofficialInstallationSource"]),
    SchemaEntry::nullable("incidentReport_info_unofficialInstallationSourceNative", &["incidentReport", "info", "unofficialInstallationSourceNative"]),
    SchemaEntry::nullable("incidentReport_info_hasFeatureTestingData", &["incidentReport", "info", "hasFeatureTestingData"]),
    SchemaEntry::nullable("incidentReport_info_appId", &["incidentReport", "info", "appId"]),
    SchemaEntry::nullable("incidentReport_info_VPNInterfaces", &["incidentReport", "info", "VPNInterfaces"]),
    SchemaEntry::nullable("incidentReport_info_appPaths", &["incidentReport", "info", "appPaths"]),
    SchemaEntry::nullable("incidentReport_info_bundleId", &["incidentReport", "info", "bundleId"]),
    SchemaEntry::nullable("incidentReport_info_bundleIdNative", &["incidentReport", "info", "bundleIdNative"]),
    SchemaEntry::nullable("incidentReport_info_iosCertificateInfo", &["incidentReport", "info", "certificateInfo"]),
    SchemaEntry::nullable("incidentReport_info_dylds", &["incidentReport", "info", "dylds"]),
    SchemaEntry::nullable("incidentReport_info_dylibs", &["incidentReport", "info", "dylibs"]),
    SchemaEntry::nullable("incidentReport_info_encryptedBinary", &["incidentReport", "info", "encryptedBinary"]),
    SchemaEntry::nullable("incidentReport_info_ffl", &["incidentReport", "info", "ffl"]),
    SchemaEntry::nullable("incidentReport_info_portOpen", &["incidentReport", "info", "portOpen"]),
    SchemaEntry::nullable("incidentReport_info_provisionIntegrity", &["incidentReport", "info", "provisionIntegrity"]),
    SchemaEntry::nullable("incidentReport_info_sBifValue", &["incidentReport", "info", "sBifValue"]),
    SchemaEntry::nullable("incidentReport_info_sbiR", &["incidentReport", "info", "sbiR"]),
    SchemaEntry::nullable("incidentReport_info_sbiW", &["incidentReport", "info", "sbiW"]),
    SchemaEntry::nullable("incidentReport_info_slPaths", &["incidentReport", "info", "slPaths"]),
    SchemaEntry::nullable("incidentReport_info_sysasm", &["incidentReport", "info", "sysasm"]),
    SchemaEntry::nullable("incidentReport_info_teamId", &["incidentReport", "info", "teamId"]),
    SchemaEntry::nullable("incidentReport_info_teamIdNative", &["incidentReport", "info", "teamIdNative"]),
    SchemaEntry::new("type", &["type"], DefaultPolicy::Literal("INFO")),
    SchemaEntry::new("valid", &["valid"], DefaultPolicy::TrueUnlessFalse),
];

/// A validated, read-only view over a field table
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    entries: &'static [SchemaEntry],
}

impl Schema {
    /// The built-in table, validated
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::new(SCHEMA)
    }

    /// Validate a table and wrap it.
    ///
    /// Rejects empty or non-identifier output names, empty paths, empty path
    /// segments and duplicate output names. Two entries may share a source path.
    pub fn new(entries: &'static [SchemaEntry]) -> Result<Self, SchemaError> {
        let mut seen = HashSet::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            if entry.output_name.is_empty() {
                return Err(SchemaError::EmptyOutputName { index });
            }
            if !OUTPUT_NAME_REGEX.is_match(entry.output_name) {
                return Err(SchemaError::InvalidOutputName {
                    name: entry.output_name.to_string(),
                });
            }
            if entry.path.is_empty() {
                return Err(SchemaError::EmptyPath {
                    name: entry.output_name.to_string(),
                });
            }
            if entry.path.iter().any(|segment| segment.is_empty()) {
                return Err(SchemaError::EmptySegment {
                    name: entry.output_name.to_string(),
                });
            }
            if !seen.insert(entry.output_name) {
                return Err(SchemaError::DuplicateOutputName {
                    name: entry.output_name.to_string(),
                });
            }
        }

        Ok(Schema { entries })
    }

    pub fn entries(&self) -> &'static [SchemaEntry] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by output name
    pub fn get(&self, output_name: &str) -> Option<&'static SchemaEntry> {
        self.entries.iter().find(|entry| entry.output_name == output_name)
    }
}
