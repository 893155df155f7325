//! CDN host selection.

use cld_models::DeliveryConfig;

/// Shared delivery host.
pub const SHARED_CDN: &str = "res.cloudinary.com";

/// Legacy shared host; treated as if no secure host was configured.
pub const OLD_AKAMAI_SHARED_CDN: &str = "cloudinary-a.akamaihd.net";

const SHARD_COUNT: u32 = 5;

/// Shard index in `1..=5` for `source`.
pub fn domain_shard(source: &str) -> u32 {
    crc32fast::hash(source.as_bytes()) % SHARD_COUNT + 1
}

/// Scheme, host and (on shared hosts) cloud name prefix of a delivery URL.
pub fn prefix(source: &str, cloud_name: &str, config: &DeliveryConfig) -> String {
    let mut shared_domain = !config.private_cdn;
    let shard = domain_shard(source);

    let mut prefix = if config.secure {
        let mut host = match config.secure_cname.as_deref() {
            Some(host) if !host.is_empty() && host != OLD_AKAMAI_SHARED_CDN => host.to_string(),
            _ if config.private_cdn => format!("{}-res.cloudinary.com", cloud_name),
            _ => SHARED_CDN.to_string(),
        };

        shared_domain = shared_domain || host == SHARED_CDN;

        let sharded = match config.secure_cdn_subdomain {
            Some(explicit) => explicit,
            None => shared_domain && config.cdn_subdomain,
        };
        if sharded {
            host = host.replace(SHARED_CDN, &format!("res-{}.cloudinary.com", shard));
        }

        format!("https://{}", host)
    } else if let Some(cname) = config.cname.as_deref().filter(|c| !c.is_empty()) {
        let subdomain = if config.cdn_subdomain {
            format!("a{}.", shard)
        } else {
            String::new()
        };
        format!("http://{}{}", subdomain, cname)
    } else {
        let mut subdomain = if config.private_cdn {
            format!("{}-res", cloud_name)
        } else {
            "res".to_string()
        };
        if config.cdn_subdomain {
            subdomain = format!("{}-{}", subdomain, shard);
        }
        format!("http://{}.cloudinary.com", subdomain)
    };

    if shared_domain {
        prefix.push('/');
        prefix.push_str(cloud_name);
    }

    prefix
}
