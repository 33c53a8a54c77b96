use std::time::Duration;

use firecheck::AppCheckConfig;
use firecheck::AppCheckVerifier;
use firecheck::Error;
use firecheck::VerifyToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Project id from GOOGLE_CLOUD_PROJECT / GCLOUD_PROJECT
    let config = AppCheckConfig::from_env()?.with_cache_ttl(Duration::from_secs(3600));
    let verifier = AppCheckVerifier::new(config);

    let token = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9...".to_string());

    match verifier.verify(&token).await {
        Ok(claims) => {
            println!("Token verified successfully");
            println!("  App ID: {}", claims.app_id());
            println!("  Issuer: {}", claims.issuer());
            println!("  Audience: {:?}", claims.audience());
        }
        Err(Error::TokenVerification(reason)) => {
            eprintln!("Token rejected: {reason}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
