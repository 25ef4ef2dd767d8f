use crate::models::{ErrorResponse, OverviewResponse, SeriesResponse};
use crate::routes::AppState;
use actix_web::{web, HttpResponse, Responder};

const TOP_LOCATIONS_FOR_TITLE: usize = 10;
const TOP_OVERVIEW: usize = 5;

/// Configure chart routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/analytics/job-titles", web::get().to(job_titles))
        .route("/analytics/job-titles/{title}/top-locations", web::get().to(top_locations_for_title))
        .route("/analytics/overview", web::get().to(overview));
}

async fn job_titles(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.dataset.job_titles())
}

/// Top company locations by mean salary for one job title
async fn top_locations_for_title(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let title = path.into_inner();
    let points = state.dataset.top_locations_for_title(&title, TOP_LOCATIONS_FOR_TITLE);

    if points.is_empty() {
        return HttpResponse::NotFound().json(ErrorResponse::new(
            "no_data",
            format!("No salary data available for the selected job title: {}", title),
            404,
        ));
    }

    HttpResponse::Ok().json(SeriesResponse {
        title: format!("Top Locations for '{}'", title),
        x_label: Some("Average Salary in USD".to_string()),
        y_label: Some("Company Location".to_string()),
        points,
    })
}

/// The general charts shown next to the predictor
async fn overview(state: web::Data<AppState>) -> impl Responder {
    let dataset = &state.dataset;

    HttpResponse::Ok().json(OverviewResponse {
        salary_by_experience: SeriesResponse {
            title: "Salary by Experience Level".to_string(),
            x_label: Some("Experience Level".to_string()),
            y_label: Some("Salary (USD)".to_string()),
            points: dataset.salary_by_experience(),
        },
        salary_by_company_size: SeriesResponse {
            title: "Salary by Company Size".to_string(),
            x_label: None,
            y_label: Some("Salary (USD)".to_string()),
            points: dataset.salary_by_company_size(),
        },
        top_locations: SeriesResponse {
            title: "Top 5 Locations by Salary".to_string(),
            x_label: None,
            y_label: Some("Avg Salary (USD)".to_string()),
            points: dataset.top_locations(TOP_OVERVIEW),
        },
        top_job_titles: SeriesResponse {
            title: "Top 5 Jobs by Salary".to_string(),
            x_label: Some("Median Salary (USD)".to_string()),
            y_label: None,
            points: dataset.top_job_titles_by_median(TOP_OVERVIEW),
        },
    })
}
