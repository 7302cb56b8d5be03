use serde::Serialize;

use crate::graph::ContentGraph;

/// Data requirement of the contact page: the site title and description.
#[derive(Debug, Clone, Serialize)]
pub struct ContactData {
    pub site_title: String,
    pub site_description: String,
}

impl ContactData {
    pub fn resolve(graph: &ContentGraph) -> Self {
        let metadata = graph.site_metadata();

        Self {
            site_title: metadata.title.clone(),
            site_description: metadata.description.clone(),
        }
    }
}

pub fn document_title(data: &ContactData) -> String {
    format!("Contact — {}", data.site_title)
}

pub fn meta_description(data: &ContactData) -> String {
    format!("Contact page of {}", data.site_description)
}

/// The contact form. Fields are uncontrolled and unvalidated; the submission
/// is a url-encoded POST handled entirely by the form-capture backend, which
/// finds the form by its name attribute.
pub fn render() -> String {
    let mut html = String::new();

    html.push_str("<div class=\"two-grids -contact\">\n");
    html.push_str("<div class=\"post-thumbnail\">\n");
    html.push_str("<h1 class=\"post-title\">Get in Touch</h1>\n");
    html.push_str("<p>Let me know what you think &rarr;</p>\n");
    html.push_str("</div>\n<div>\n");
    html.push_str(
        "<form class=\"form-container\" name=\"contact\" method=\"post\" data-netlify=\"true\">\n",
    );
    html.push_str("<input type=\"hidden\" name=\"form-name\" value=\"contact\" />\n");
    html.push_str("<div><label>Your Name: <input type=\"text\" name=\"name\" /></label></div>\n");
    html.push_str("<div><label>Your Email: <input type=\"email\" name=\"email\" /></label></div>\n");
    html.push_str("<div><label>Subject: <input type=\"text\" name=\"subject\" /></label></div>\n");
    html.push_str("<div><label>Message: <textarea name=\"message\"></textarea></label></div>\n");
    html.push_str(
        "<div class=\"form-actions\"><button type=\"submit\" class=\"button -primary\">Submit this form</button></div>\n",
    );
    html.push_str("</form>\n</div>\n</div>\n");

    html
}
