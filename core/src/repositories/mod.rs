pub mod subject;
pub mod token;

pub use subject::SubjectRepository;
pub use token::OpaqueTokenRepository;

#[cfg(test)]
pub use subject::InMemorySubjectRepository;
#[cfg(test)]
pub use token::InMemoryTokenRepository;
