pub mod acionamento;
pub mod compra;
pub mod perda;
pub mod usuario;
