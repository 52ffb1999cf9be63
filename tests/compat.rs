// ABOUTME: Integration tests for API version comparison and capability gating.
// ABOUTME: Verifies fail-closed comparisons and non-mutating endpoint sanitization.

use lookout::compat::*;

mod version_comparison {
    use super::*;

    #[test]
    fn version_satisfies_itself() {
        for v in ["1.24", "1.44", "1.44.1", "v1.41", "2"] {
            assert!(is_api_version_at_least(v, v), "{}", v);
        }
    }

    #[test]
    fn older_minor_is_not_enough() {
        assert!(!is_api_version_at_least("1.43", "1.44"));
    }

    #[test]
    fn patch_above_minimum_is_enough() {
        assert!(is_api_version_at_least("1.44.1", "1.44"));
        assert!(is_api_version_at_least("1.44", "1.44.0"));
        assert!(!is_api_version_at_least("1.44", "1.44.1"));
    }

    #[test]
    fn comparison_is_numeric() {
        assert!(is_api_version_at_least("1.100", "1.44"));
        assert!(!is_api_version_at_least("1.9", "1.44"));
    }

    #[test]
    fn leading_v_is_ignored() {
        assert!(is_api_version_at_least("v1.45", "1.44"));
        assert!(is_api_version_at_least("1.45", "v1.44"));
    }

    #[test]
    fn invalid_versions_fail_closed() {
        assert!(!is_api_version_at_least("invalid", "1.44"));
        assert!(!is_api_version_at_least("", "1.44"));
        assert!(!is_api_version_at_least("1.44", "garbage"));
        assert!(!is_api_version_at_least("1.44-rc1", "1.44"));
    }
}

mod features {
    use super::*;

    #[test]
    fn endpoint_mac_address_requires_1_44() {
        assert_eq!(MIN_API_VERSION_ENDPOINT_MAC_ADDRESS, "1.44");
        assert!(!supports_endpoint_mac_address("1.43"));
        assert!(supports_endpoint_mac_address("1.44"));
        assert!(supports_feature(Feature::EndpointMacAddress, "1.47"));
    }
}

mod sanitize {
    use super::*;

    fn settings() -> EndpointSettingsMap {
        let mut map = EndpointSettingsMap::new();
        map.insert(
            "frontend".to_string(),
            EndpointSettings {
                mac_address: "02:42:ac:11:00:02".to_string(),
                ip_address: "10.1.0.5".to_string(),
                aliases: vec!["web".to_string()],
            },
        );
        map.insert(
            "backend".to_string(),
            EndpointSettings {
                mac_address: String::new(),
                ip_address: String::new(),
                aliases: vec!["api".to_string(), "api-v2".to_string()],
            },
        );
        map
    }

    #[test]
    fn old_engine_loses_mac_but_keeps_everything_else() {
        let original = settings();
        let snapshot = original.clone();

        let sanitized = sanitize_endpoint_settings(Some(&original), "1.43").unwrap();

        assert_eq!(sanitized.len(), 2);
        let frontend = &sanitized["frontend"];
        assert!(frontend.mac_address.is_empty());
        assert_eq!(frontend.ip_address, "10.1.0.5");
        assert_eq!(frontend.aliases, vec!["web".to_string()]);
        assert_eq!(sanitized["backend"], snapshot["backend"]);

        assert_eq!(original, snapshot, "caller's map must be unchanged");
    }

    #[test]
    fn new_engine_keeps_mac() {
        let original = settings();
        let sanitized = sanitize_endpoint_settings(Some(&original), "1.44").unwrap();
        assert_eq!(sanitized, original);
    }

    #[test]
    fn invalid_version_is_treated_as_unsupported() {
        let original = settings();
        let sanitized = sanitize_endpoint_settings(Some(&original), "not-a-version").unwrap();
        assert!(sanitized["frontend"].mac_address.is_empty());
    }

    #[test]
    fn same_settings_reused_across_engines() {
        let shared = settings();
        let old = sanitize_endpoint_settings(Some(&shared), "1.41").unwrap();
        let new = sanitize_endpoint_settings(Some(&shared), "1.45").unwrap();
        assert!(old["frontend"].mac_address.is_empty());
        assert_eq!(new["frontend"].mac_address, "02:42:ac:11:00:02");
    }

    #[test]
    fn absent_or_empty_input_yields_none() {
        assert!(sanitize_endpoint_settings(None, "1.44").is_none());
        assert!(sanitize_endpoint_settings(Some(&EndpointSettingsMap::new()), "1.43").is_none());
    }
}
