use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    pub cors_origins: Vec<String>,
    // Image hosting
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub cloudinary_folder: String,
}

impl Config {
    pub fn init() -> anyhow::Result<Config> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY must be set")?;
        let jwt_maxage = std::env::var("JWT_MAXAGE")
            .context("JWT_MAXAGE must be set")?
            .parse::<i64>()
            .context("JWT_MAXAGE must be a number of minutes")?;

        let port = match std::env::var("PORT") {
            Ok(port) => port.parse::<u16>().context("PORT must be a valid port number")?,
            Err(_) => 8000,
        };

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(10);

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        // Image hosting (empty credentials make every upload fail loudly)
        let cloudinary_cloud_name = std::env::var("CLOUDINARY_CLOUD_NAME")
            .unwrap_or_else(|_| "".to_string());
        let cloudinary_api_key = std::env::var("CLOUDINARY_API_KEY")
            .unwrap_or_else(|_| "".to_string());
        let cloudinary_api_secret = std::env::var("CLOUDINARY_API_SECRET")
            .unwrap_or_else(|_| "".to_string());
        let cloudinary_folder = std::env::var("CLOUDINARY_FOLDER")
            .unwrap_or_else(|_| "listings".to_string());

        Ok(Config {
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_maxage,
            port,
            cors_origins,
            cloudinary_cloud_name,
            cloudinary_api_key,
            cloudinary_api_secret,
            cloudinary_folder,
        })
    }
}
