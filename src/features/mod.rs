mod encoder;
mod scaler;
mod tfidf;
mod tokenize;
mod vector;

pub use encoder::{BlockSchema, EncoderParams, FeatureEncoder, FeatureMatrix, FeatureSchema};
pub use scaler::MinMaxScaler;
pub use tfidf::TfidfVectorizer;
pub use tokenize::TokenizerKind;
pub use vector::SparseVector;
