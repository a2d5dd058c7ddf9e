pub mod hugging_face;
