//! 解码器 trait 定义.

use lyra_core::LyraResult;

use crate::frame::AudioFrame;
use crate::options::DecoderOptions;
use crate::packet::Packet;

/// 解码器 trait
///
/// 解码流程:
/// 1. 调用 `send_packet()` 送入压缩数据
/// 2. 调用 `receive_frame()` 取出解码后的帧
/// 3. 重复以上步骤直到所有数据处理完毕
/// 4. 送入空包 (flush) 表示输入结束
pub trait Decoder: Send {
    /// 获取解码器名称
    fn name(&self) -> &str;

    /// 使用选项配置解码器
    ///
    /// 默认实现为空操作.
    fn open(&mut self, _options: &DecoderOptions) -> LyraResult<()> {
        Ok(())
    }

    /// 送入一个压缩数据包进行解码
    ///
    /// # 参数
    /// - `packet`: 压缩数据包. 送入空包表示输入结束.
    fn send_packet(&mut self, packet: &Packet) -> LyraResult<()>;

    /// 从解码器取出一帧解码数据
    ///
    /// # 返回
    /// - `Ok(frame)`: 成功取出一帧
    /// - `Err(LyraError::NeedMoreData)`: 需要送入更多数据包
    /// - `Err(LyraError::Eof)`: 所有帧已取出
    fn receive_frame(&mut self) -> LyraResult<AudioFrame>;

    /// 刷新解码器, 丢弃跨包的重叠状态与未取出的帧
    fn flush(&mut self);
}
