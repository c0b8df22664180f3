pub mod authenticate;
pub mod github_login;
pub mod logout;
