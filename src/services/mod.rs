pub mod delivery_service;
pub mod format_service;
pub mod pipeline_service;
pub mod raster_service;
pub mod render_service;
pub mod report_service;
